//! Error types for the presence layer.

use wordsiege_protocol::PlayerId;

/// Errors from presence transitions.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    /// The player has no seat in this room.
    #[error("player {0} has no seat in this room")]
    Unknown(PlayerId),

    /// Reconnect attempted while the seat is still connected — usually a
    /// second connection racing the first.
    #[error("player {0} is already connected")]
    AlreadyConnected(PlayerId),

    /// The reconnect arrived after the grace window closed.
    #[error("grace window elapsed for player {0}")]
    GraceElapsed(PlayerId),

    /// The seat was already abandoned.
    #[error("player {0} abandoned the match")]
    Abandoned(PlayerId),
}
