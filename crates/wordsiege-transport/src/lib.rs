//! Transport layer for Wordsiege.
//!
//! The [`Connection`] trait moves opaque byte frames; the codec above it
//! decides what they mean. Browser clients connect over WebSocket
//! ([`WebSocketListener`], the default feature); the traits keep the
//! gateway testable against an in-memory connection.
//!
//! # Feature flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketListener};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection. Distinct from a player identity:
/// one player may hold many connection ids over a match's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Listener: Send + 'static {
    type Conn: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Conn, Self::Error>;

    /// The address the listener is bound to (useful with port 0).
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// A single bidirectional message connection.
///
/// `send` and `recv` may be called concurrently from different tasks;
/// implementations must not let a pending receive block a send.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame. `Ok(None)` means the peer closed the
    /// connection cleanly.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_round_trips() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnectionId::new(1), "alice");
        map.insert(ConnectionId::new(2), "bob");
        assert_eq!(map[&ConnectionId::new(1)], "alice");
    }
}
