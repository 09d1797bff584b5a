use crate::room::{RoomCommand, RoomManager};
use crate::signaling::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{Sink, SinkExt, Stream, StreamExt};
use huddle_core::{ConnectionId, ParticipantIdentity, SignalMessage};
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Shared state of the `/ws` route.
#[derive(Clone)]
pub struct ServerState {
    pub signaling: SignalingService,
    pub rooms: RoomManager,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<ServerState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: ServerState) {
    let (sender, receiver) = socket.split();
    run_connection(sender, receiver, state).await;
}

/// Drives one client connection until either half of it closes. The room
/// the client joined is told about the disconnect in both cases.
pub async fn run_connection<S, R, E>(mut sender: S, mut receiver: R, state: ServerState)
where
    S: Sink<Message> + Unpin + Send + 'static,
    R: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Send + 'static,
{
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {:?}", connection_id);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let joined_room: Arc<OnceLock<mpsc::Sender<RoomCommand>>> = Arc::new(OnceLock::new());

    state.signaling.add_peer(connection_id.clone(), tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let connection_id = connection_id.clone();
        let joined_room = joined_room.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                let text = match msg {
                    Message::Text(text) => text,
                    Message::Close(_) => break,
                    _ => continue,
                };
                let signal = match serde_json::from_str::<SignalMessage>(&text) {
                    Ok(signal) => signal,
                    Err(e) => {
                        warn!("Invalid SignalMessage from {:?}: {:?}", connection_id, e);
                        continue;
                    }
                };

                if let SignalMessage::Join { room, display_name } = signal {
                    if joined_room.get().is_some() {
                        reject(&state, &connection_id, "Already joined a room");
                        continue;
                    }
                    if room.as_str().is_empty() {
                        reject(&state, &connection_id, "Room name must not be empty");
                        continue;
                    }

                    info!("{:?} wants to join room '{}'", connection_id, room);
                    let tx = state.rooms.get_room_sender(&room);
                    let _ = joined_room.set(tx.clone());
                    let identity =
                        ParticipantIdentity::new(connection_id.clone(), display_name, room);
                    if let Err(e) = tx.send(RoomCommand::Join { identity }).await {
                        error!("Room died: {}", e);
                        break;
                    }

                    let ice_servers = state.signaling.get_ice_servers();
                    if !ice_servers.is_empty() {
                        state
                            .signaling
                            .send_signal(&connection_id, SignalMessage::IceConfig { ice_servers });
                    }
                    state.signaling.send_signal(
                        &connection_id,
                        SignalMessage::Welcome {
                            connection_id: connection_id.clone(),
                        },
                    );
                    continue;
                }

                let Some(tx) = joined_room.get() else {
                    reject(&state, &connection_id, "Join a room first");
                    continue;
                };

                let cmd = match signal {
                    SignalMessage::AnnouncePresence => RoomCommand::AnnouncePresence {
                        connection_id: connection_id.clone(),
                    },
                    SignalMessage::Departed { connection_id: id } => {
                        if id != connection_id {
                            warn!("{:?} reported departure of {:?}", connection_id, id);
                        }
                        RoomCommand::Departed {
                            connection_id: connection_id.clone(),
                        }
                    }
                    message @ (SignalMessage::Offer { .. }
                    | SignalMessage::Answer { .. }
                    | SignalMessage::IceCandidate { .. }) => RoomCommand::Relay {
                        from: connection_id.clone(),
                        message,
                    },
                    other => {
                        warn!("Unexpected {:?} from {:?}", other, connection_id);
                        continue;
                    }
                };

                if let Err(e) = tx.send(cmd).await {
                    error!("Room died: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    if let Some(room_tx) = joined_room.get() {
        let _ = room_tx
            .send(RoomCommand::Disconnect {
                connection_id: connection_id.clone(),
            })
            .await;
    }

    state.signaling.remove_peer(&connection_id);
    info!("WebSocket disconnected: {:?}", connection_id);
}

fn reject(state: &ServerState, connection_id: &ConnectionId, message: &str) {
    warn!("Rejecting message from {:?}: {}", connection_id, message);
    state.signaling.send_signal(
        connection_id,
        SignalMessage::Error {
            message: message.to_string(),
        },
    );
}
