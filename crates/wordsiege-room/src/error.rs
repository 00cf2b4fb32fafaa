//! Error types for the room layer.

use wordsiege_protocol::{PlayerId, RoomId};
use wordsiege_session::PresenceError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (or was already torn down).
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// Both seats are taken.
    #[error("room {0} is full")]
    Full(RoomId),

    /// The player tried to join while seated in another room.
    #[error("player {0} is already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The player has no seat in this room.
    #[error("player {0} is not in room {1}")]
    NotInRoom(PlayerId, RoomId),

    /// Only the creator may delete a room.
    #[error("player {0} is not the creator of room {1}")]
    NotCreator(PlayerId, RoomId),

    /// Reconnection refused by the presence ledger (grace elapsed,
    /// seat abandoned, or a duplicate connection).
    #[error("reconnect rejected: {0}")]
    Reconnect(#[from] PresenceError),

    /// The room's command channel is closed — the actor is gone.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
