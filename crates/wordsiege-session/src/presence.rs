//! The presence ledger: per-room tracking of who is connected, who is in
//! their reconnection grace window, and who is gone for good.
//!
//! # Concurrency note
//!
//! `PresenceLedger` is NOT thread-safe by itself — it uses a plain
//! `HashMap`. This is intentional: each room actor owns exactly one
//! ledger and mutates it from its command loop, so there is nothing to
//! lock. Expiry is event-driven (the room schedules a timer per
//! disconnect) rather than scan-based.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use wordsiege_protocol::PlayerId;

use crate::PresenceError;

/// Configuration for presence behavior.
#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// How long a disconnected player has to reconnect before their seat
    /// is abandoned and the match ends for them.
    pub grace: Duration,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
        }
    }
}

/// One player's presence within a room.
///
/// ```text
///   Connected ──(disconnect)──→ Grace ──(timer fires)──→ Abandoned
///       ↑                         │
///       └───────(reconnect)───────┘
/// ```
///
/// `Abandoned` is terminal: the seat stays recorded (so a stale reconnect
/// gets a definitive refusal instead of "unknown player") until the room
/// removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    Connected,
    /// Disconnected at `since`; reconnectable until the grace elapses.
    Grace { since: Instant },
    Abandoned,
}

/// Tracks presence for every player seated in one room.
pub struct PresenceLedger {
    players: HashMap<PlayerId, PresenceState>,
    config: PresenceConfig,
}

impl PresenceLedger {
    pub fn new(config: PresenceConfig) -> Self {
        Self {
            players: HashMap::new(),
            config,
        }
    }

    pub fn grace(&self) -> Duration {
        self.config.grace
    }

    /// Seats a player as connected. Also used when a returning player is
    /// re-seated after the room recreated their entry.
    pub fn occupy(&mut self, player: PlayerId) {
        self.players.insert(player, PresenceState::Connected);
    }

    /// Starts the grace window for a connected player.
    pub fn disconnect(&mut self, player: PlayerId) -> Result<(), PresenceError> {
        let state = self
            .players
            .get_mut(&player)
            .ok_or(PresenceError::Unknown(player))?;
        match state {
            PresenceState::Connected => {
                *state = PresenceState::Grace {
                    since: Instant::now(),
                };
                tracing::info!(%player, "presence: grace window opened");
                Ok(())
            }
            PresenceState::Grace { .. } => Ok(()),
            PresenceState::Abandoned => Err(PresenceError::Abandoned(player)),
        }
    }

    /// Brings a player in their grace window back to connected.
    ///
    /// The elapsed-time check here is a backstop: the room's grace timer
    /// normally flips the state to `Abandoned` first, but a reconnect can
    /// race the timer's command through the actor queue.
    pub fn reconnect(&mut self, player: PlayerId) -> Result<(), PresenceError> {
        let state = self
            .players
            .get_mut(&player)
            .ok_or(PresenceError::Unknown(player))?;
        match *state {
            PresenceState::Grace { since } => {
                if since.elapsed() > self.config.grace {
                    *state = PresenceState::Abandoned;
                    return Err(PresenceError::GraceElapsed(player));
                }
                *state = PresenceState::Connected;
                tracing::info!(%player, "presence: reconnected within grace");
                Ok(())
            }
            PresenceState::Connected => {
                Err(PresenceError::AlreadyConnected(player))
            }
            PresenceState::Abandoned => Err(PresenceError::Abandoned(player)),
        }
    }

    /// Abandons a player whose grace window elapsed. Returns `false` when
    /// the player reconnected in the meantime (a late timer fire), in
    /// which case nothing changes.
    pub fn expire(&mut self, player: PlayerId) -> bool {
        match self.players.get_mut(&player) {
            Some(state @ PresenceState::Grace { .. }) => {
                *state = PresenceState::Abandoned;
                tracing::info!(%player, "presence: grace elapsed, seat abandoned");
                true
            }
            _ => false,
        }
    }

    /// Drops a player's seat entirely (leave, room teardown).
    pub fn remove(&mut self, player: PlayerId) {
        self.players.remove(&player);
    }

    pub fn state(&self, player: PlayerId) -> Option<PresenceState> {
        self.players.get(&player).copied()
    }

    pub fn is_connected(&self, player: PlayerId) -> bool {
        matches!(self.state(player), Some(PresenceState::Connected))
    }

    /// `true` while any seated player sits in a grace window — the match
    /// is paused for everyone until they return or time out.
    pub fn any_in_grace(&self) -> bool {
        self.players
            .values()
            .any(|s| matches!(s, PresenceState::Grace { .. }))
    }
}
