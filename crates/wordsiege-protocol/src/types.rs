//! Core identity and game-state types that travel on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Assigned by the server when a client introduces itself with a stable
/// identity string. The same identity string always resolves to the same
/// `PlayerId`, which is how reconnecting players are recognized — the
/// transient connection id changes across reconnects, this does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// An opaque token identifying a room.
///
/// Generated by the registry (6 lowercase alphanumeric characters),
/// immutable for the room's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Slots and settings
// ---------------------------------------------------------------------------

/// One of the two fixed occupancy positions in a room.
///
/// A slot is assigned once per room membership and preserved across
/// reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Player1,
    Player2,
}

impl Slot {
    /// The opposing slot.
    pub fn opponent(self) -> Slot {
        match self {
            Slot::Player1 => Slot::Player2,
            Slot::Player2 => Slot::Player1,
        }
    }

    /// Index into per-slot arrays (`Player1` → 0, `Player2` → 1).
    pub fn index(self) -> usize {
        match self {
            Slot::Player1 => 0,
            Slot::Player2 => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Player1 => write!(f, "player1"),
            Slot::Player2 => write!(f, "player2"),
        }
    }
}

/// How a room is meant to be played. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Realtime,
    TurnBased,
    SinglePlayer,
    Local,
}

impl GameMode {
    /// How many occupied slots this mode needs before play starts.
    pub fn required_players(self) -> usize {
        match self {
            GameMode::Realtime | GameMode::TurnBased => 2,
            GameMode::SinglePlayer | GameMode::Local => 1,
        }
    }
}

/// Room capacity and mode, immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettings {
    /// 1 or 2.
    pub max_players: usize,
    pub mode: GameMode,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            max_players: 2,
            mode: GameMode::Realtime,
        }
    }
}

/// Whether a room still has a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Open,
    Full,
}

/// A summary of a room returned in room listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListEntry {
    pub room_id: RoomId,
    pub name: String,
    pub players: usize,
    pub max_players: usize,
    pub status: RoomStatus,
    /// True when the listing was produced for the room's creator.
    pub is_creator: bool,
}

// ---------------------------------------------------------------------------
// Match snapshot types
// ---------------------------------------------------------------------------

/// Both castles' hit points, always in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HpPair {
    pub player1: u32,
    pub player2: u32,
}

impl HpPair {
    pub fn get(&self, slot: Slot) -> u32 {
        match slot {
            Slot::Player1 => self.player1,
            Slot::Player2 => self.player2,
        }
    }

    pub fn set(&mut self, slot: Slot, value: u32) {
        match slot {
            Slot::Player1 => self.player1 = value,
            Slot::Player2 => self.player2 = value,
        }
    }
}

/// A scored word in a `GameStats` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordScore {
    pub word: String,
    pub damage: u32,
}

/// Why a submitted word was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    TooShort,
    GivenWord,
    AlreadyUsed,
    NotFormable,
    NotInDictionary,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RejectReason::TooShort => "too short",
            RejectReason::GivenWord => "cannot reuse given word",
            RejectReason::AlreadyUsed => "already used",
            RejectReason::NotFormable => "cannot be formed from given letters",
            RejectReason::NotInDictionary => "not a recognized word",
        };
        write!(f, "{msg}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        // `#[serde(transparent)]` means PlayerId(42) → `42`, not `{"0":42}`.
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId("k3x9qa".into())).unwrap();
        assert_eq!(json, "\"k3x9qa\"");
    }

    #[test]
    fn test_slot_opponent_is_involutive() {
        assert_eq!(Slot::Player1.opponent(), Slot::Player2);
        assert_eq!(Slot::Player2.opponent().opponent(), Slot::Player2);
    }

    #[test]
    fn test_slot_serializes_snake_case() {
        let json = serde_json::to_string(&Slot::Player1).unwrap();
        assert_eq!(json, "\"player1\"");
    }

    #[test]
    fn test_game_mode_required_players() {
        assert_eq!(GameMode::Realtime.required_players(), 2);
        assert_eq!(GameMode::TurnBased.required_players(), 2);
        assert_eq!(GameMode::SinglePlayer.required_players(), 1);
        assert_eq!(GameMode::Local.required_players(), 1);
    }

    #[test]
    fn test_hp_pair_get_set_by_slot() {
        let mut hp = HpPair {
            player1: 100,
            player2: 100,
        };
        hp.set(Slot::Player2, 37);
        assert_eq!(hp.get(Slot::Player2), 37);
        assert_eq!(hp.get(Slot::Player1), 100);
    }

    #[test]
    fn test_reject_reason_display_matches_contract() {
        assert_eq!(RejectReason::TooShort.to_string(), "too short");
        assert_eq!(
            RejectReason::NotFormable.to_string(),
            "cannot be formed from given letters"
        );
    }
}
