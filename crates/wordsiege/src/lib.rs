//! # Wordsiege
//!
//! Server-authoritative backend for a real-time two-player word-combat
//! game. Players share a long challenge word, forge shorter words out of
//! its letters, and trade damage until one castle falls.
//!
//! The crate ties the workspace's layers together — transport, protocol,
//! session, room — behind a single [`WordsiegeServer`]:
//!
//! ```rust,no_run
//! use wordsiege::WordsiegeServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wordsiege::WordsiegeError> {
//!     let server = WordsiegeServer::builder()
//!         .bind("0.0.0.0:3000")
//!         .dictionary_path("data/words.txt")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod gateway;
mod server;

pub use error::WordsiegeError;
pub use server::{WordsiegeServer, WordsiegeServerBuilder};

// Re-exported so embedders and tests don't need the layer crates on
// their own dependency list.
pub use wordsiege_game::{DEFAULT_CHALLENGE_POOL, Dictionary};
pub use wordsiege_protocol::{
    ClientMessage, GameMode, Notification, PlayerId, RejectReason, RoomId,
    Slot,
};
