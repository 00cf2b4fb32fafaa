//! Per-connection gateway: handshake, intent dispatch, and notification
//! pumping.
//!
//! Each accepted connection runs this task. The flow is:
//!   1. Receive `Hello { identity }` → intern the identity → `Welcome`
//!   2. Loop: fan in the connection, the player's room channel, and the
//!      lobby broadcast
//!   3. On drop: report the disconnect to the player's room so the grace
//!      window opens
//!
//! Lobby-level intents (create/join/list/delete) are answered here;
//! gameplay intents are forwarded to the room actor, which replies
//! through the player's notification channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use wordsiege_protocol::{
    ClientMessage, Codec, Notification, PlayerId, ProtocolError, RoomId,
    RoomSettings,
};
use wordsiege_room::{PlayerSender, RoomError};
use wordsiege_transport::{Connection, TransportError};

use crate::WordsiegeError;
use crate::server::ServerState;

/// How long a fresh connection may idle before sending `Hello`.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C, T>(
    conn: T,
    state: Arc<ServerState<C>>,
) -> Result<(), WordsiegeError>
where
    C: Codec,
    T: Connection<Error = TransportError>,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let player_id = perform_handshake(&conn, &state).await?;
    tracing::info!(%conn_id, %player_id, "player introduced");

    // The room actor pushes notifications through this channel; the
    // gateway owns the only receiver and forwards onto the wire.
    let (tx, mut room_rx) = mpsc::unbounded_channel::<Notification>();
    let mut lobby_rx = state.lobby.subscribe();

    loop {
        tokio::select! {
            incoming = conn.recv() => {
                match incoming {
                    Ok(Some(data)) => {
                        let msg: ClientMessage = match state.codec.decode(&data) {
                            Ok(msg) => msg,
                            Err(e) => {
                                tracing::debug!(
                                    %player_id, error = %e, "undecodable intent"
                                );
                                notify(
                                    &conn,
                                    &state.codec,
                                    &Notification::Error {
                                        code: 400,
                                        message: "invalid message".into(),
                                    },
                                )
                                .await?;
                                continue;
                            }
                        };
                        dispatch(&conn, &state, player_id, &tx, msg).await?;
                    }
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                }
            }

            Some(n) = room_rx.recv() => {
                notify(&conn, &state.codec, &n).await?;
            }

            lobby = lobby_rx.recv() => {
                match lobby {
                    Ok(n) => notify(&conn, &state.codec, &n).await?,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::trace!(%player_id, skipped, "lobby lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    // The seat stays reserved for the grace window; the room decides
    // what a failure to return means.
    state.registry.lock().await.disconnect(player_id).await;
    Ok(())
}

/// Waits for `Hello`, interns the identity, and replies with `Welcome`.
async fn perform_handshake<C, T>(
    conn: &T,
    state: &Arc<ServerState<C>>,
) -> Result<PlayerId, WordsiegeError>
where
    C: Codec,
    T: Connection<Error = TransportError>,
{
    let data = match tokio::time::timeout(HANDSHAKE_TIMEOUT, conn.recv()).await
    {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage(
                "connection closed before hello".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage(
                "hello timed out".into(),
            )
            .into());
        }
    };

    let identity = match state.codec.decode::<ClientMessage>(&data) {
        Ok(ClientMessage::Hello { identity }) => identity,
        Ok(_) => {
            notify(
                conn,
                &state.codec,
                &Notification::Error {
                    code: 400,
                    message: "expected hello".into(),
                },
            )
            .await?;
            return Err(ProtocolError::InvalidMessage(
                "first message must be hello".into(),
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    let player_id = state.identities.lock().await.resolve(&identity);
    notify(conn, &state.codec, &Notification::Welcome { player_id }).await?;
    Ok(player_id)
}

/// Routes one decoded intent.
async fn dispatch<C, T>(
    conn: &T,
    state: &Arc<ServerState<C>>,
    player_id: PlayerId,
    tx: &PlayerSender,
    msg: ClientMessage,
) -> Result<(), WordsiegeError>
where
    C: Codec,
    T: Connection<Error = TransportError>,
{
    match msg {
        ClientMessage::Hello { .. } => {
            notify(
                conn,
                &state.codec,
                &Notification::Error {
                    code: 400,
                    message: "already introduced".into(),
                },
            )
            .await?;
        }

        ClientMessage::CreateRoom {
            name,
            max_players,
            mode,
        } => {
            let settings = RoomSettings { max_players, mode };
            let (room_id, room_name) = {
                let mut registry = state.registry.lock().await;
                registry.create(player_id, name, settings)
            };
            notify(
                conn,
                &state.codec,
                &Notification::RoomCreated {
                    room_id: room_id.clone(),
                    room_name,
                    mode,
                },
            )
            .await?;

            // The creator takes the first seat immediately.
            let joined = {
                let mut registry = state.registry.lock().await;
                registry.join(player_id, &room_id, tx.clone()).await
            };
            match joined {
                Ok(slot) => {
                    notify(
                        conn,
                        &state.codec,
                        &Notification::JoinedRoom { room_id, slot },
                    )
                    .await?;
                    announce_listing_change(state);
                }
                Err(e) => report_join_error(conn, state, room_id, e).await?,
            }
        }

        ClientMessage::JoinRoom { room_id } => {
            let joined = {
                let mut registry = state.registry.lock().await;
                registry.join(player_id, &room_id, tx.clone()).await
            };
            match joined {
                Ok(slot) => {
                    notify(
                        conn,
                        &state.codec,
                        &Notification::JoinedRoom { room_id, slot },
                    )
                    .await?;
                    announce_listing_change(state);
                }
                Err(e) => report_join_error(conn, state, room_id, e).await?,
            }
        }

        ClientMessage::Reconnect { room_id } => {
            let result = {
                let mut registry = state.registry.lock().await;
                registry.reconnect(player_id, &room_id, tx.clone()).await
            };
            match result {
                Ok(slot) => {
                    notify(
                        conn,
                        &state.codec,
                        &Notification::JoinedRoom {
                            room_id,
                            slot: Some(slot),
                        },
                    )
                    .await?;
                }
                Err(e) => {
                    tracing::debug!(
                        %player_id, %room_id, error = %e, "reconnect refused"
                    );
                    notify(conn, &state.codec, &Notification::ReconnectFailed)
                        .await?;
                }
            }
        }

        ClientMessage::LeaveRoom => {
            let result = {
                let mut registry = state.registry.lock().await;
                registry.leave(player_id).await
            };
            if let Err(e) = result {
                tracing::debug!(%player_id, error = %e, "leave failed");
            }
            announce_listing_change(state);
        }

        ClientMessage::DeleteRoom { room_id } => {
            let was_member = {
                let registry = state.registry.lock().await;
                registry.player_room(player_id) == Some(&room_id)
            };
            let result = {
                let mut registry = state.registry.lock().await;
                registry.delete(player_id, &room_id).await
            };
            match result {
                Ok(()) => {
                    // Seated members heard RoomDeleted from the actor; a
                    // creator deleting from the lobby needs a direct ack.
                    if !was_member {
                        notify(conn, &state.codec, &Notification::RoomDeleted)
                            .await?;
                    }
                    announce_listing_change(state);
                }
                Err(e) => {
                    tracing::debug!(
                        %player_id, %room_id, error = %e, "delete refused"
                    );
                    notify(
                        conn,
                        &state.codec,
                        &Notification::DeleteRoomFailed { room_id },
                    )
                    .await?;
                }
            }
        }

        ClientMessage::ListRooms => {
            let rooms = {
                let mut registry = state.registry.lock().await;
                registry.list(player_id).await
            };
            notify(conn, &state.codec, &Notification::RoomList { rooms })
                .await?;
        }

        // Gameplay intents go to the player's room; replies come back
        // through the notification channel.
        msg @ (ClientMessage::SubmitWord { .. }
        | ClientMessage::ConfirmHit
        | ClientMessage::RestartGame
        | ClientMessage::RequestGameState
        | ClientMessage::RequestGameStats) => {
            let result = {
                let mut registry = state.registry.lock().await;
                registry.route(player_id, msg).await
            };
            if let Err(e) = result {
                notify(
                    conn,
                    &state.codec,
                    &Notification::Error {
                        code: 400,
                        message: e.to_string(),
                    },
                )
                .await?;
            }
        }
    }

    Ok(())
}

/// Maps a join failure onto the protocol's dedicated notifications.
async fn report_join_error<C, T>(
    conn: &T,
    state: &Arc<ServerState<C>>,
    room_id: RoomId,
    e: RoomError,
) -> Result<(), WordsiegeError>
where
    C: Codec,
    T: Connection<Error = TransportError>,
{
    let n = match e {
        RoomError::Full(_) => Notification::RoomFull { room_id },
        RoomError::NotFound(_) | RoomError::Unavailable(_) => {
            Notification::RoomNotFound { room_id }
        }
        other => Notification::Error {
            code: 409,
            message: other.to_string(),
        },
    };
    notify(conn, &state.codec, &n).await
}

/// Tells every connected client the room listing changed. Losing this
/// hint is harmless, so send errors are ignored.
fn announce_listing_change<C: Codec>(state: &Arc<ServerState<C>>) {
    let _ = state.lobby.send(Notification::RoomListUpdated);
}

/// Encodes and sends one notification.
async fn notify<C, T>(
    conn: &T,
    codec: &C,
    n: &Notification,
) -> Result<(), WordsiegeError>
where
    C: Codec,
    T: Connection<Error = TransportError>,
{
    let bytes = codec.encode(n)?;
    conn.send(&bytes).await?;
    Ok(())
}
