//! Unified error type for the Wordsiege server.

use wordsiege_protocol::ProtocolError;
use wordsiege_room::RoomError;
use wordsiege_session::PresenceError;
use wordsiege_transport::TransportError;

/// Top-level error that wraps all layer-specific errors, so the server
/// and its binary deal with a single type and plain `?`.
#[derive(Debug, thiserror::Error)]
pub enum WordsiegeError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, not creator).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A presence-level error (grace elapsed, seat abandoned).
    #[error(transparent)]
    Presence(#[from] PresenceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordsiege_protocol::RoomId;

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomId("ab12cd".into()));
        let top: WordsiegeError = err.into();
        assert!(matches!(top, WordsiegeError::Room(_)));
        assert!(top.to_string().contains("ab12cd"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let top: WordsiegeError = err.into();
        assert!(matches!(top, WordsiegeError::Protocol(_)));
    }
}
