use std::time::Duration;

use tracing_subscriber::EnvFilter;
use wordsiege::{WordsiegeError, WordsiegeServer};

#[tokio::main]
async fn main() -> Result<(), WordsiegeError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let dictionary = std::env::var("WORDSIEGE_DICT")
        .unwrap_or_else(|_| "data/words.txt".to_string());

    let mut builder = WordsiegeServer::builder()
        .bind(&format!("0.0.0.0:{port}"))
        .dictionary_path(dictionary);

    if let Ok(secs) = std::env::var("WORDSIEGE_GRACE_SECS") {
        match secs.parse::<u64>() {
            Ok(secs) => {
                builder = builder.grace(Duration::from_secs(secs));
            }
            Err(_) => {
                tracing::warn!(
                    value = %secs,
                    "WORDSIEGE_GRACE_SECS is not a number; using the default"
                );
            }
        }
    }

    let server = builder.build().await?;
    server.run().await
}
