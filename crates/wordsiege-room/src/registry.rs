//! Room registry: creates rooms, tracks which player sits where, and
//! routes intents to the right actor.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use wordsiege_game::Dictionary;
use wordsiege_protocol::{
    ClientMessage, PlayerId, RoomId, RoomListEntry, RoomSettings, Slot,
};
use wordsiege_session::PresenceConfig;

use crate::room::spawn_room;
use crate::{PlayerSender, RoomError, RoomHandle, RoomInfo};

/// Room ids are short, lowercase base-36 strings — easy to read aloud
/// and paste into a join box.
const ROOM_ID_LEN: usize = 6;
const ROOM_ID_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Manages all active rooms.
///
/// Not thread-safe by itself; the server wraps it in an async mutex.
/// Actors that stopped on their own (abandonment, emptiness) leave a
/// closed handle behind — the registry prunes those lazily whenever it
/// touches its map.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomHandle>,
    /// Which room each player is seated in. A player sits in at most one
    /// room at a time.
    player_rooms: HashMap<PlayerId, RoomId>,
    dictionary: Arc<Dictionary>,
    presence: PresenceConfig,
}

impl RoomRegistry {
    pub fn new(dictionary: Arc<Dictionary>, presence: PresenceConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            dictionary,
            presence,
        }
    }

    /// Creates a room and returns its id and display name. The creator
    /// is not seated yet — the caller follows up with [`Self::join`].
    pub fn create(
        &mut self,
        creator: PlayerId,
        name: Option<String>,
        settings: RoomSettings,
    ) -> (RoomId, String) {
        self.prune_closed();

        // Capacity comes from the client; only 1 and 2 are meaningful.
        let settings = RoomSettings {
            max_players: settings.max_players.clamp(1, 2),
            ..settings
        };

        let room_id = loop {
            let candidate = generate_room_id();
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Room {room_id}"));

        let handle = spawn_room(
            room_id.clone(),
            name.clone(),
            creator,
            settings,
            Arc::clone(&self.dictionary),
            self.presence.clone(),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(room_id.clone(), handle);
        tracing::info!(%room_id, name = %name, %creator, "room created");
        (room_id, name)
    }

    /// Seats a player in a room, enforcing "one room at a time".
    ///
    /// A stale index entry (the indexed room died, or the room dropped
    /// the player without the registry hearing about it) is repaired here
    /// rather than blocking the join.
    pub async fn join(
        &mut self,
        player_id: PlayerId,
        room_id: &RoomId,
        sender: PlayerSender,
    ) -> Result<Option<Slot>, RoomError> {
        if let Some(current) = self.player_rooms.get(&player_id).cloned() {
            if current != *room_id {
                if self.still_seated(player_id, &current).await {
                    return Err(RoomError::AlreadyInRoom(player_id, current));
                }
                // No seat there, but an observer channel may linger;
                // tell the old room to drop it before moving on.
                if let Some(old) = self.rooms.get(&current) {
                    let _ = old.leave(player_id).await;
                }
                self.player_rooms.remove(&player_id);
            }
        }

        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let slot = handle.join(player_id, sender).await?;
        self.player_rooms.insert(player_id, room_id.clone());
        Ok(slot)
    }

    /// Re-attaches a returning player to their seat in `room_id`.
    pub async fn reconnect(
        &mut self,
        player_id: PlayerId,
        room_id: &RoomId,
        sender: PlayerSender,
    ) -> Result<Slot, RoomError> {
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let slot = handle.reconnect(player_id, sender).await?;
        self.player_rooms.insert(player_id, room_id.clone());
        Ok(slot)
    }

    /// Reports a dropped transport to the player's room, if any.
    pub async fn disconnect(&mut self, player_id: PlayerId) {
        if let Some(room_id) = self.player_rooms.get(&player_id) {
            if let Some(handle) = self.rooms.get(room_id) {
                handle.disconnect(player_id).await;
            }
        }
        // The index entry stays: the player may reconnect into the same
        // room within the grace window.
    }

    pub async fn leave(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let Some(room_id) = self.player_rooms.remove(&player_id) else {
            return Ok(());
        };
        if let Some(handle) = self.rooms.get(&room_id) {
            handle.leave(player_id).await?;
        }
        Ok(())
    }

    /// Deletes a room. The actor enforces that `requester` created it.
    pub async fn delete(
        &mut self,
        requester: PlayerId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        handle.delete(requester).await?;
        self.rooms.remove(room_id);
        self.player_rooms.retain(|_, rid| rid != room_id);
        tracing::info!(%room_id, %requester, "room deleted");
        Ok(())
    }

    /// Lists all live rooms from `viewer`'s perspective. Dead handles
    /// discovered along the way are pruned.
    pub async fn list(&mut self, viewer: PlayerId) -> Vec<RoomListEntry> {
        self.prune_closed();

        let mut entries = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(info) = handle.info().await {
                entries.push(RoomListEntry {
                    room_id: info.room_id,
                    name: info.name,
                    players: info.players.len(),
                    max_players: info.max_players,
                    status: info.status,
                    is_creator: info.creator == viewer,
                });
            }
        }
        entries.sort_by(|a, b| a.room_id.0.cmp(&b.room_id.0));
        entries
    }

    /// Routes a gameplay intent to the player's current room.
    pub async fn route(
        &mut self,
        player_id: PlayerId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        let room_id = self
            .player_rooms
            .get(&player_id)
            .cloned()
            .ok_or_else(|| {
                RoomError::NotInRoom(player_id, RoomId(String::new()))
            })?;

        let handle = self.rooms.get(&room_id).ok_or_else(|| {
            self.player_rooms.remove(&player_id);
            RoomError::NotFound(room_id.clone())
        })?;

        handle.intent(player_id, msg).await
    }

    pub fn player_room(&self, player_id: PlayerId) -> Option<&RoomId> {
        self.player_rooms.get(&player_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Queries the indexed room to see whether the player still holds a
    /// seat there; a dead actor counts as "not seated".
    async fn still_seated(&self, player_id: PlayerId, room_id: &RoomId) -> bool {
        match self.rooms.get(room_id) {
            Some(handle) => match handle.info().await {
                Ok(info) => info.players.contains(&player_id),
                Err(_) => false,
            },
            None => false,
        }
    }

    /// Drops handles whose actor has stopped, together with any index
    /// entries pointing at them.
    fn prune_closed(&mut self) {
        let before = self.rooms.len();
        self.rooms.retain(|_, handle| !handle.is_closed());
        if self.rooms.len() != before {
            let live: std::collections::HashSet<&RoomId> =
                self.rooms.keys().collect();
            self.player_rooms.retain(|_, rid| live.contains(rid));
            tracing::debug!(
                pruned = before - self.rooms.len(),
                "pruned stopped rooms"
            );
        }
    }
}

fn generate_room_id() -> RoomId {
    let mut rng = rand::rng();
    let id: String = (0..ROOM_ID_LEN)
        .map(|_| {
            let i = rng.random_range(0..ROOM_ID_CHARSET.len());
            ROOM_ID_CHARSET[i] as char
        })
        .collect();
    RoomId(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_wellformed() {
        for _ in 0..50 {
            let RoomId(id) = generate_room_id();
            assert_eq!(id.len(), ROOM_ID_LEN);
            assert!(
                id.bytes().all(|b| ROOM_ID_CHARSET.contains(&b)),
                "unexpected character in {id}"
            );
        }
    }
}
