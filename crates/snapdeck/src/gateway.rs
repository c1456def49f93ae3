//! Per-connection handler: request decoding, dispatch, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The write half of the socket is owned by a writer task that pumps the
//! connection's event channel, so the room actor (and this handler) push
//! events without ever touching the socket directly. The read half stays
//! here: decode a request, resolve the room through the registry, forward.
//!
//! Structural failures (unknown room, full room, duplicate membership) go
//! back to the requester as an `init_error`. Invalid in-game actions are
//! swallowed by the game state machine and produce nothing.

use std::sync::Arc;

use tokio::sync::mpsc;

use snapdeck_protocol::{
    ClientRequest, Codec, ConnectionId, RoomCode, ServerEvent,
};
use snapdeck_room::{EventSender, RoomError};

use crate::ServerError;
use crate::server::ServerState;
use crate::ws::{WsReceiver, WsSender};

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec + Clone>(
    sender: WsSender,
    mut receiver: WsReceiver,
    conn: ConnectionId,
    state: Arc<ServerState<C>>,
) -> Result<(), ServerError> {
    tracing::debug!(%conn, "handling new connection");

    // All events for this connection funnel through one channel; a writer
    // task serializes them onto the socket. The room actor holds a clone
    // of the sender, so its broadcasts and our direct replies share the
    // same ordered pipe.
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_events(
        sender,
        events_rx,
        state.codec.clone(),
        conn,
    ));

    loop {
        let data = match receiver.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn, error = %e, "recv error");
                break;
            }
        };

        let request: ClientRequest = match state.codec.decode(&data) {
            Ok(req) => req,
            Err(e) => {
                tracing::debug!(
                    %conn, error = %e, "failed to decode request"
                );
                continue;
            }
        };

        dispatch(&state, conn, request, &events_tx).await;
    }

    // The socket is gone. Tell the room (survivor gets `opponent_left`)
    // and tear it down before the writer is released.
    state.registry.lock().await.handle_disconnect(conn).await;

    drop(events_tx);
    let _ = writer.await;
    Ok(())
}

/// Routes one decoded request to the registry.
async fn dispatch<C: Codec>(
    state: &Arc<ServerState<C>>,
    conn: ConnectionId,
    request: ClientRequest,
    events: &EventSender,
) {
    match request {
        ClientRequest::CreateRoom { name } => {
            let result = {
                let mut registry = state.registry.lock().await;
                registry.create_room(conn, name, events.clone()).await
            };
            match result {
                Ok(room_id) => {
                    let _ = events
                        .send(ServerEvent::RoomCreated { room_id });
                }
                Err(e) => send_init_error(events, conn, &e),
            }
        }

        ClientRequest::JoinRoom { room_id, name } => {
            let result = {
                let mut registry = state.registry.lock().await;
                registry
                    .join_room(&room_id, conn, name, events.clone())
                    .await
            };
            // On success the room answers for itself: the second join
            // triggers the deal and both players get `game_start`.
            if let Err(e) = result {
                send_init_error(events, conn, &e);
            }
        }

        ClientRequest::PlayCard { room_id } => {
            forward(state, conn, &room_id, Action::Play).await;
        }

        ClientRequest::SnapAttempt { room_id } => {
            forward(state, conn, &room_id, Action::Snap).await;
        }

        ClientRequest::RequestRestart { room_id } => {
            let result =
                state.registry.lock().await.restart(&room_id, conn).await;
            if let Err(e) = result {
                send_init_error(events, conn, &e);
            }
        }

        ClientRequest::LeaveRoom { room_id } => {
            let result = {
                let mut registry = state.registry.lock().await;
                registry.leave_room(&room_id, conn).await
            };
            if let Err(e) = result {
                tracing::debug!(%conn, error = %e, "leave room failed");
            }
        }
    }
}

enum Action {
    Play,
    Snap,
}

/// Forwards an in-game action. A stale room code is not worth an error
/// event; games referencing dead rooms just go quiet.
async fn forward<C: Codec>(
    state: &Arc<ServerState<C>>,
    conn: ConnectionId,
    room_id: &RoomCode,
    action: Action,
) {
    let registry = state.registry.lock().await;
    let result = match action {
        Action::Play => registry.play(room_id, conn).await,
        Action::Snap => registry.snap(room_id, conn).await,
    };
    if let Err(e) = result {
        tracing::debug!(%conn, room = %room_id, error = %e, "action dropped");
    }
}

fn send_init_error(
    events: &EventSender,
    conn: ConnectionId,
    error: &RoomError,
) {
    tracing::debug!(%conn, error = %error, "request failed");
    let _ = events.send(ServerEvent::InitError {
        message: error.to_string(),
    });
}

/// Writer task: drains the event channel onto the socket. Exits when
/// every sender clone is dropped or the peer stops reading.
async fn write_events<C: Codec>(
    mut sender: WsSender,
    mut events: mpsc::UnboundedReceiver<ServerEvent>,
    codec: C,
    conn: ConnectionId,
) {
    while let Some(event) = events.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(%conn, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = sender.send(bytes).await {
            tracing::debug!(%conn, error = %e, "send failed, dropping writer");
            break;
        }
    }
    let _ = sender.close().await;
}
