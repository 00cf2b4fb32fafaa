//! Room actor: an isolated Tokio task that owns one match.
//!
//! Each room runs in its own task and communicates with the outside
//! world through an mpsc channel — no shared mutable state, just message
//! passing. The actor owns the match state, the presence ledger, and the
//! grace timers; every rule decision for the room happens on this one
//! task, which is what makes the pending-damage and grace semantics easy
//! to reason about.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use wordsiege_game::{Dictionary, HitResult, MatchState, Submission};
use wordsiege_protocol::{
    ClientMessage, Notification, PlayerId, RoomId, RoomSettings, RoomStatus,
    Slot,
};
use wordsiege_session::{PresenceConfig, PresenceLedger};
use wordsiege_timer::DeadlineTimers;

use crate::RoomError;

/// Channel sender for delivering notifications to a player's connection.
pub type PlayerSender = mpsc::UnboundedSender<Notification>;

const SLOTS: [Slot; 2] = [Slot::Player1, Slot::Player2];

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel — the
/// caller sends a command and waits for the response on it. Commands
/// without one are fire-and-forget.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<Option<Slot>, RoomError>>,
    },

    Reconnect {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<Slot, RoomError>>,
    },

    /// The player's transport dropped. Opens the grace window.
    Disconnect { player_id: PlayerId },

    /// Injected by a grace timer. May arrive late — after the player
    /// already reconnected — in which case it is a no-op.
    GraceExpired { player_id: PlayerId },

    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// A gameplay intent from a seated player.
    Intent {
        player_id: PlayerId,
        msg: ClientMessage,
    },

    Delete {
        requester: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
}

/// A snapshot of room metadata for listings and index validation.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub name: String,
    pub creator: PlayerId,
    /// Seated players, slot order.
    pub players: Vec<PlayerId>,
    pub max_players: usize,
    pub status: RoomStatus,
}

/// Handle to a running room actor. Cheap to clone — an `mpsc::Sender`
/// wrapper plus the room id.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// `true` once the actor has stopped; the registry prunes such
    /// handles lazily.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }

    /// Seats the player, or acknowledges an existing seat. `Ok(None)`
    /// means the creator was admitted as a slotless observer of their
    /// own full room.
    pub async fn join(
        &self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<Option<Slot>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Re-attaches a returning player to their seat.
    pub async fn reconnect(
        &self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<Slot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Reconnect {
                player_id,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Reports a dropped transport (fire-and-forget).
    pub async fn disconnect(&self, player_id: PlayerId) {
        let _ = self
            .sender
            .send(RoomCommand::Disconnect { player_id })
            .await;
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Delivers a gameplay intent (fire-and-forget; outcomes arrive as
    /// notifications on the player's channel).
    pub async fn intent(
        &self,
        player_id: PlayerId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Intent { player_id, msg })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Tears the room down. Refused unless `requester` is the creator.
    pub async fn delete(&self, requester: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Delete {
                requester,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    name: String,
    creator: PlayerId,
    settings: RoomSettings,
    slots: [Option<PlayerId>; 2],
    /// Per-player notification channels (seated players plus, possibly,
    /// the creator observing their own full room).
    senders: HashMap<PlayerId, PlayerSender>,
    presence: PresenceLedger,
    timers: DeadlineTimers<PlayerId>,
    dictionary: Arc<Dictionary>,
    /// `None` until both seats fill and the first challenge is drawn.
    game: Option<MatchState>,
    /// Clone of the actor's own command sender; grace timers inject
    /// `GraceExpired` through it.
    self_tx: mpsc::Sender<RoomCommand>,
    receiver: mpsc::Receiver<RoomCommand>,
    done: bool,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, name = %self.name, "room started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Reconnect {
                    player_id,
                    sender,
                    reply,
                } => {
                    let result = self.handle_reconnect(player_id, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Disconnect { player_id } => {
                    self.handle_disconnect(player_id);
                }
                RoomCommand::GraceExpired { player_id } => {
                    self.handle_grace_expired(player_id);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(player_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Intent { player_id, msg } => {
                    self.handle_intent(player_id, msg);
                }
                RoomCommand::Delete { requester, reply } => {
                    let result = self.handle_delete(requester);
                    let _ = reply.send(result);
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
            }
            if self.done {
                break;
            }
        }

        self.timers.cancel_all();
        tracing::info!(room_id = %self.room_id, "room stopped");
    }

    // -- membership ------------------------------------------------------

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<Option<Slot>, RoomError> {
        // Re-joining one's own seat is idempotent; refresh the channel.
        if let Some(slot) = self.slot_of(player_id) {
            self.senders.insert(player_id, sender);
            self.presence.occupy(player_id);
            return Ok(Some(slot));
        }

        // The capacity bound, not the slot array, decides fullness: a
        // single-player room has a spare slot that must stay empty.
        let seated = self.slots.iter().flatten().count();
        if seated >= self.settings.max_players {
            // The creator may watch their own full room without a seat.
            if player_id == self.creator {
                self.senders.insert(player_id, sender);
                return Ok(None);
            }
            return Err(RoomError::Full(self.room_id.clone()));
        }

        if let Some(index) = self.slots.iter().position(Option::is_none) {
            let slot = SLOTS[index];
            self.slots[index] = Some(player_id);
            self.senders.insert(player_id, sender);
            self.presence.occupy(player_id);
            tracing::info!(
                room_id = %self.room_id,
                %player_id,
                %slot,
                "player seated"
            );
            self.start_match_if_ready();
            return Ok(Some(slot));
        }

        Err(RoomError::Full(self.room_id.clone()))
    }

    fn handle_reconnect(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<Slot, RoomError> {
        let slot = self.slot_of(player_id).ok_or_else(|| {
            RoomError::NotInRoom(player_id, self.room_id.clone())
        })?;

        self.presence.reconnect(player_id)?;
        self.timers.cancel(&player_id);
        self.senders.insert(player_id, sender);

        if let Some(game) = &self.game {
            self.send_to(
                player_id,
                Notification::GameState {
                    given_word: game.given_word().to_owned(),
                    hp: game.hp(),
                },
            );
        }
        self.broadcast_except(player_id, Notification::PlayerReconnected { slot });
        if !self.presence.any_in_grace() {
            self.broadcast(Notification::ResumeGame);
        }
        Ok(slot)
    }

    fn handle_disconnect(&mut self, player_id: PlayerId) {
        self.senders.remove(&player_id);

        let Some(slot) = self.slot_of(player_id) else {
            // Observer creator dropping; nothing to pause.
            self.finish_if_empty();
            return;
        };

        if self.game.is_none() {
            // No match yet — a dropped creator just vacates the seat.
            self.slots[slot.index()] = None;
            self.presence.remove(player_id);
            self.finish_if_empty();
            return;
        }

        // An unconfirmed hit dies with the connection.
        if let Some(game) = &mut self.game {
            game.cancel_pending(player_id);
        }

        if self.presence.disconnect(player_id).is_ok() {
            self.timers.schedule(
                player_id,
                self.presence.grace(),
                self.self_tx.clone(),
                RoomCommand::GraceExpired { player_id },
            );
            self.broadcast(Notification::PlayerDisconnected { slot });
        }
    }

    fn handle_grace_expired(&mut self, player_id: PlayerId) {
        // A late fire after reconnection changes nothing.
        if !self.presence.expire(player_id) {
            return;
        }
        let Some(slot) = self.slot_of(player_id) else {
            return;
        };
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            %slot,
            "grace elapsed, match abandoned"
        );
        self.broadcast(Notification::GameAbandoned { slot });
        self.done = true;
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        self.senders.remove(&player_id);

        let Some(slot) = self.slot_of(player_id) else {
            // Observer leaving; fine.
            self.finish_if_empty();
            return Ok(());
        };

        self.slots[slot.index()] = None;
        self.presence.remove(player_id);
        self.timers.cancel(&player_id);

        if let Some(game) = &mut self.game {
            game.cancel_pending(player_id);
            if !game.is_ended() {
                // Walking out mid-match abandons it for the opponent.
                self.broadcast(Notification::GameAbandoned { slot });
                self.done = true;
                return Ok(());
            }
        }

        self.finish_if_empty();
        Ok(())
    }

    fn handle_delete(&mut self, requester: PlayerId) -> Result<(), RoomError> {
        if requester != self.creator {
            return Err(RoomError::NotCreator(
                requester,
                self.room_id.clone(),
            ));
        }
        self.broadcast(Notification::RoomDeleted);
        self.done = true;
        Ok(())
    }

    // -- gameplay --------------------------------------------------------

    fn handle_intent(&mut self, player_id: PlayerId, msg: ClientMessage) {
        if self.slot_of(player_id).is_none() {
            tracing::warn!(
                room_id = %self.room_id,
                %player_id,
                "gameplay intent from a player without a seat, ignoring"
            );
            return;
        }

        match msg {
            ClientMessage::SubmitWord { word, multiplier } => {
                if multiplier.is_some() {
                    tracing::trace!(
                        room_id = %self.room_id,
                        %player_id,
                        "client-supplied multiplier ignored"
                    );
                }
                self.handle_submit(player_id, &word);
            }
            ClientMessage::ConfirmHit => self.handle_confirm(player_id),
            ClientMessage::RestartGame => self.handle_restart(player_id),
            ClientMessage::RequestGameState => {
                if let Some(game) = &self.game {
                    self.send_to(
                        player_id,
                        Notification::GameState {
                            given_word: game.given_word().to_owned(),
                            hp: game.hp(),
                        },
                    );
                } else {
                    self.send_error(player_id, 404, "no active game");
                }
            }
            ClientMessage::RequestGameStats => {
                match (&self.game, self.slot_of(player_id)) {
                    (Some(game), Some(slot)) => {
                        let stats = game.stats(slot);
                        self.send_to(
                            player_id,
                            Notification::GameStats {
                                your_unique_words: stats.your_unique_words,
                                opponent_unique_words: stats
                                    .opponent_unique_words,
                                common_words: stats.common_words,
                            },
                        );
                    }
                    _ => self.send_error(player_id, 404, "no active game"),
                }
            }
            other => {
                tracing::warn!(
                    room_id = %self.room_id,
                    %player_id,
                    ?other,
                    "non-gameplay intent routed to room, ignoring"
                );
            }
        }
    }

    fn handle_submit(&mut self, player_id: PlayerId, word: &str) {
        let Some(slot) = self.slot_of(player_id) else {
            return;
        };
        if self.presence.any_in_grace() {
            self.send_error(player_id, 409, "game paused");
            return;
        }
        let Some(game) = &mut self.game else {
            self.send_error(player_id, 404, "no active game");
            return;
        };

        match game.submit(&self.dictionary, player_id, slot, word, Instant::now())
        {
            Some(Submission::Accepted { word, damage }) => {
                tracing::debug!(
                    room_id = %self.room_id,
                    %player_id,
                    word = %word,
                    damage,
                    "word accepted"
                );
                self.send_to(
                    player_id,
                    Notification::WordResult {
                        valid: true,
                        word,
                        damage: Some(damage),
                        reason: None,
                        increase_multiplier: true,
                        reset_multiplier: false,
                    },
                );
            }
            Some(Submission::Rejected { reason }) => {
                self.send_to(
                    player_id,
                    Notification::WordResult {
                        valid: false,
                        word: word.to_owned(),
                        damage: None,
                        reason: Some(reason),
                        increase_multiplier: false,
                        reset_multiplier: true,
                    },
                );
            }
            None => {
                // Match already over; nothing to judge until a restart.
            }
        }
    }

    fn handle_confirm(&mut self, player_id: PlayerId) {
        // A pending hit survives the pause; it may land after resume.
        if self.presence.any_in_grace() {
            self.send_error(player_id, 409, "game paused");
            return;
        }
        let Some(game) = &mut self.game else {
            return;
        };
        match game.confirm(player_id) {
            Some(HitResult::Applied { hp }) => {
                self.broadcast(Notification::HpUpdate { hp });
            }
            Some(HitResult::Ended { hp, winner }) => {
                self.broadcast(Notification::HpUpdate { hp });
                self.broadcast(Notification::GameEnded { winner });
                tracing::info!(
                    room_id = %self.room_id,
                    ?winner,
                    "match ended"
                );
            }
            None => {
                // Stale or duplicate confirmation; silently dropped.
            }
        }
    }

    fn handle_restart(&mut self, player_id: PlayerId) {
        if self.presence.any_in_grace() {
            self.send_error(player_id, 409, "game paused");
            return;
        }
        if self.game.is_none() {
            self.send_error(player_id, 404, "no active game");
            return;
        }
        let Some(word) = self.dictionary.pick_challenge() else {
            self.send_error(player_id, 503, "no challenge words available");
            return;
        };
        let word = word.to_owned();
        if let Some(game) = &mut self.game {
            game.restart(word.clone());
        }
        tracing::info!(room_id = %self.room_id, given_word = %word, "match restarted");
        self.broadcast(Notification::GameRestarted { given_word: word });
    }

    fn start_match_if_ready(&mut self) {
        if self.game.is_some() {
            return;
        }
        let seated = self.slots.iter().flatten().count();
        if seated < self.settings.mode.required_players() {
            return;
        }
        let Some(word) = self.dictionary.pick_challenge() else {
            tracing::warn!(
                room_id = %self.room_id,
                "cannot start match: vocabulary is empty"
            );
            self.broadcast_error(503, "no challenge words available");
            return;
        };
        let word = word.to_owned();
        self.game = Some(MatchState::new(word.clone()));
        tracing::info!(room_id = %self.room_id, given_word = %word, "match started");
        self.broadcast(Notification::GameStarted { given_word: word });
    }

    // -- plumbing --------------------------------------------------------

    fn slot_of(&self, player_id: PlayerId) -> Option<Slot> {
        self.slots
            .iter()
            .position(|s| *s == Some(player_id))
            .map(|i| SLOTS[i])
    }

    /// Closes the room once nobody is seated or listening.
    fn finish_if_empty(&mut self) {
        if self.senders.is_empty() && self.slots.iter().all(Option::is_none) {
            self.done = true;
        }
    }

    fn broadcast(&self, n: Notification) {
        for sender in self.senders.values() {
            let _ = sender.send(n.clone());
        }
    }

    fn broadcast_except(&self, excluded: PlayerId, n: Notification) {
        for (pid, sender) in &self.senders {
            if *pid != excluded {
                let _ = sender.send(n.clone());
            }
        }
    }

    /// Silently drops if the receiver is gone (player disconnected).
    fn send_to(&self, player_id: PlayerId, n: Notification) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(n);
        }
    }

    fn send_error(&self, player_id: PlayerId, code: u16, message: &str) {
        self.send_to(
            player_id,
            Notification::Error {
                code,
                message: message.to_owned(),
            },
        );
    }

    fn broadcast_error(&self, code: u16, message: &str) {
        self.broadcast(Notification::Error {
            code,
            message: message.to_owned(),
        });
    }

    fn info(&self) -> RoomInfo {
        let players: Vec<PlayerId> =
            self.slots.iter().flatten().copied().collect();
        let status = if players.len() >= self.settings.max_players {
            RoomStatus::Full
        } else {
            RoomStatus::Open
        };
        RoomInfo {
            room_id: self.room_id.clone(),
            name: self.name.clone(),
            creator: self.creator,
            players,
            max_players: self.settings.max_players,
            status,
        }
    }
}

/// Spawns a room actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it fills.
pub(crate) fn spawn_room(
    room_id: RoomId,
    name: String,
    creator: PlayerId,
    settings: RoomSettings,
    dictionary: Arc<Dictionary>,
    presence: PresenceConfig,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id: room_id.clone(),
        name,
        creator,
        settings,
        slots: [None, None],
        senders: HashMap::new(),
        presence: PresenceLedger::new(presence),
        timers: DeadlineTimers::new(),
        dictionary,
        game: None,
        self_tx: tx.clone(),
        receiver: rx,
        done: false,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
