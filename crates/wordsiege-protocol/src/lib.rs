//! Wire protocol for Wordsiege.
//!
//! Defines the language clients and the server speak:
//!
//! - **Types** ([`PlayerId`], [`RoomId`], [`Slot`], [`HpPair`], ...) —
//!   identities and snapshots that appear inside messages.
//! - **Messages** ([`ClientMessage`], [`Notification`]) — the closed
//!   intent/notification tagged unions.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — how messages become bytes.
//!
//! The protocol layer knows nothing about connections, rooms, or game
//! rules; it only describes what travels on the wire.

mod codec;
mod error;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{ClientMessage, Notification};
pub use types::{
    GameMode, HpPair, PlayerId, RejectReason, RoomId, RoomListEntry,
    RoomSettings, RoomStatus, Slot, WordScore,
};
