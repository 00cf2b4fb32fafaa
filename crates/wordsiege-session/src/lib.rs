//! Player identity and presence for Wordsiege.
//!
//! Two concerns live here:
//! - [`IdentityRegistry`] interns client identity strings into stable
//!   [`PlayerId`](wordsiege_protocol::PlayerId)s, shared server-wide.
//! - [`PresenceLedger`] tracks, per room, whether each seated player is
//!   connected, inside their reconnection grace window, or gone.

pub mod error;
pub mod identity;
pub mod presence;

pub use error::PresenceError;
pub use identity::IdentityRegistry;
pub use presence::{PresenceConfig, PresenceLedger, PresenceState};
