//! Rooms for Wordsiege: one actor task per room, plus the registry that
//! creates and routes to them.
//!
//! A room actor owns everything about one match — the seats, the match
//! state, the presence ledger, and the grace timers — and processes
//! commands from a single channel. The [`RoomRegistry`] maps room ids to
//! handles and enforces that a player sits in at most one room.

pub mod error;
pub mod registry;
pub mod room;

pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{PlayerSender, RoomHandle, RoomInfo};
