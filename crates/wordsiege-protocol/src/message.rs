//! The closed intent/notification message surface.
//!
//! The boundary is an asynchronous bidirectional message protocol: clients
//! send intents, the server pushes notifications. Both directions are
//! closed tagged unions — there is no dynamic event-name dispatch. Serde's
//! internally tagged representation (`{"type": "submit_word", ...}`) keeps
//! the JSON easy to switch on from a browser client.

use serde::{Deserialize, Serialize};

use crate::{
    GameMode, HpPair, PlayerId, RejectReason, RoomId, RoomListEntry, Slot,
    WordScore,
};

/// Intents a client may send. The first message on any connection must be
/// [`ClientMessage::Hello`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Introduce a stable identity. `identity` survives reconnects; the
    /// server answers with [`Notification::Welcome`].
    Hello { identity: String },

    CreateRoom {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_max_players")]
        max_players: usize,
        #[serde(default)]
        mode: GameMode,
    },

    JoinRoom { room_id: RoomId },

    /// Re-attach to a room after a dropped connection, within the grace
    /// window. Matched by identity, not by connection.
    Reconnect { room_id: RoomId },

    LeaveRoom,

    DeleteRoom { room_id: RoomId },

    ListRooms,

    /// Submit a candidate word. `multiplier` is accepted for wire
    /// compatibility with older clients and ignored — the combo multiplier
    /// is tracked server-side and never trusted from the client.
    SubmitWord {
        word: String,
        #[serde(default)]
        multiplier: Option<f64>,
    },

    /// The submitter's projectile effect landed; commit the pending damage.
    ConfirmHit,

    RestartGame,

    RequestGameState,

    RequestGameStats,
}

fn default_max_players() -> usize {
    2
}

/// Pushes from the server. Delivery is fire-and-forget, at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Welcome { player_id: PlayerId },

    RoomCreated {
        room_id: RoomId,
        room_name: String,
        mode: GameMode,
    },

    /// `slot` is `None` for the creator acknowledged as a slotless
    /// observer of their own full room.
    JoinedRoom {
        room_id: RoomId,
        slot: Option<Slot>,
    },

    RoomFull { room_id: RoomId },
    RoomNotFound { room_id: RoomId },

    RoomList { rooms: Vec<RoomListEntry> },
    /// Lobby-wide hint that the listing changed; clients re-request it.
    RoomListUpdated,
    RoomDeleted,
    DeleteRoomFailed { room_id: RoomId },

    GameStarted { given_word: String },

    /// Outcome of a word submission, pushed to the submitter only.
    WordResult {
        valid: bool,
        word: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        damage: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<RejectReason>,
        increase_multiplier: bool,
        reset_multiplier: bool,
    },

    HpUpdate { hp: HpPair },

    /// `winner` is `None` on a draw (both castles down).
    GameEnded { winner: Option<Slot> },

    GameRestarted { given_word: String },

    GameState { given_word: String, hp: HpPair },

    GameStats {
        your_unique_words: Vec<WordScore>,
        opponent_unique_words: Vec<WordScore>,
        common_words: Vec<WordScore>,
    },

    PlayerDisconnected { slot: Slot },
    PlayerReconnected { slot: Slot },
    ResumeGame,
    GameAbandoned { slot: Slot },
    ReconnectFailed,

    Error { code: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_json_shape() {
        let msg = ClientMessage::Hello {
            identity: "ab12cd".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "hello");
        assert_eq!(json["identity"], "ab12cd");
    }

    #[test]
    fn test_create_room_defaults_when_fields_missing() {
        let json = r#"{"type": "create_room"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::CreateRoom {
                name,
                max_players,
                mode,
            } => {
                assert!(name.is_none());
                assert_eq!(max_players, 2);
                assert_eq!(mode, GameMode::Realtime);
            }
            other => panic!("expected CreateRoom, got {other:?}"),
        }
    }

    #[test]
    fn test_submit_word_client_multiplier_is_optional() {
        let json = r#"{"type": "submit_word", "word": "молоко"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::SubmitWord {
                word: "молоко".into(),
                multiplier: None,
            }
        );
    }

    #[test]
    fn test_word_result_omits_absent_fields() {
        let n = Notification::WordResult {
            valid: true,
            word: "око".into(),
            damage: Some(4),
            reason: None,
            increase_multiplier: true,
            reset_multiplier: false,
        };
        let json: serde_json::Value = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "word_result");
        assert_eq!(json["damage"], 4);
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_game_ended_draw_serializes_null_winner() {
        let n = Notification::GameEnded { winner: None };
        let json: serde_json::Value = serde_json::to_value(&n).unwrap();
        assert!(json["winner"].is_null());
    }

    #[test]
    fn test_notification_round_trip() {
        let n = Notification::GameStats {
            your_unique_words: vec![WordScore {
                word: "колокол".into(),
                damage: 11,
            }],
            opponent_unique_words: vec![],
            common_words: vec![WordScore {
                word: "око".into(),
                damage: 4,
            }],
        };
        let bytes = serde_json::to_vec(&n).unwrap();
        let decoded: Notification = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(n, decoded);
    }

    #[test]
    fn test_decode_unknown_intent_returns_error() {
        let unknown = r#"{"type": "fly_to_moon", "speed": 9000}"#;
        let result: Result<ClientMessage, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }
}
