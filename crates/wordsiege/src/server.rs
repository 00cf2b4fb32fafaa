//! `WordsiegeServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → session → room. Each
//! accepted connection gets a gateway task; all cross-connection state
//! lives in [`ServerState`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use wordsiege_game::{DEFAULT_CHALLENGE_POOL, Dictionary};
use wordsiege_protocol::{Codec, JsonCodec, Notification};
use wordsiege_room::RoomRegistry;
use wordsiege_session::{IdentityRegistry, PresenceConfig};
use wordsiege_transport::{Listener, WebSocketListener};

use crate::WordsiegeError;
use crate::gateway::handle_connection;

/// Capacity of the lobby broadcast channel. Only tiny hint messages
/// travel on it, so lagging receivers lose nothing of substance.
const LOBBY_CAPACITY: usize = 64;

/// Shared server state, cloned into each gateway task behind an `Arc`.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) identities: Mutex<IdentityRegistry>,
    pub(crate) codec: C,
    /// Lobby-wide pushes (room list changes). Every gateway subscribes.
    pub(crate) lobby: broadcast::Sender<Notification>,
}

/// Builder for configuring and starting a Wordsiege server.
///
/// ```rust,ignore
/// let server = WordsiegeServer::builder()
///     .bind("0.0.0.0:3000")
///     .dictionary_path("data/words.txt")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct WordsiegeServerBuilder {
    bind_addr: String,
    dictionary_path: Option<PathBuf>,
    dictionary: Option<Dictionary>,
    challenge_pool: usize,
    grace: Duration,
}

impl WordsiegeServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            dictionary_path: None,
            dictionary: None,
            challenge_pool: DEFAULT_CHALLENGE_POOL,
            grace: PresenceConfig::default().grace,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Loads the vocabulary from a newline-separated word list.
    pub fn dictionary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dictionary_path = Some(path.into());
        self
    }

    /// Uses a pre-built dictionary (tests, embedded word lists).
    pub fn dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// How many of the longest words form the challenge pool.
    pub fn challenge_pool(mut self, size: usize) -> Self {
        self.challenge_pool = size;
        self
    }

    /// The reconnection grace window.
    pub fn grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Builds the server, binding the WebSocket listener.
    pub async fn build(self) -> Result<WordsiegeServer<JsonCodec>, WordsiegeError> {
        let listener = WebSocketListener::bind(&self.bind_addr).await?;

        let dictionary = Arc::new(match (self.dictionary, self.dictionary_path) {
            (Some(dict), _) => dict,
            (None, Some(path)) => Dictionary::load(path, self.challenge_pool),
            (None, None) => {
                tracing::warn!(
                    "no dictionary configured; every word will be rejected"
                );
                Dictionary::from_words(
                    std::iter::empty::<&str>(),
                    self.challenge_pool,
                )
            }
        });

        let presence = PresenceConfig { grace: self.grace };
        let (lobby, _) = broadcast::channel(LOBBY_CAPACITY);

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new(dictionary, presence)),
            identities: Mutex::new(IdentityRegistry::new()),
            codec: JsonCodec,
            lobby,
        });

        Ok(WordsiegeServer { listener, state })
    }
}

impl Default for WordsiegeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Wordsiege server. Call [`run()`](Self::run) to start
/// accepting connections.
pub struct WordsiegeServer<C: Codec + Clone> {
    listener: WebSocketListener,
    state: Arc<ServerState<C>>,
}

impl WordsiegeServer<JsonCodec> {
    pub fn builder() -> WordsiegeServerBuilder {
        WordsiegeServerBuilder::new()
    }
}

impl<C: Codec + Clone> WordsiegeServer<C> {
    /// The bound address (useful when binding port 0 in tests).
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, WordsiegeError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(mut self) -> Result<(), WordsiegeError> {
        tracing::info!("Wordsiege server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
