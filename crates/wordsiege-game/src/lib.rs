//! Game rules for Wordsiege: the vocabulary, the damage formula, the
//! submission judge, and the per-round match state.
//!
//! Everything in this crate is synchronous and side-effect free (apart
//! from dictionary loading); the room actor owns a [`MatchState`] and
//! drives it from its command loop.

pub mod dictionary;
pub mod judge;
pub mod scorer;
pub mod state;

pub use dictionary::{DEFAULT_CHALLENGE_POOL, Dictionary};
pub use judge::{Verdict, can_form, judge};
pub use scorer::score;
pub use state::{
    HitResult, MatchState, MatchStats, PendingDamage, Phase, STARTING_HP,
    Submission,
};
