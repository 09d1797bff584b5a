use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{ConnectionId, IceServerConfig, ParticipantIdentity, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

struct SignalingInner {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Registry of open sockets, shared by every room.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(connection_id, tx);
    }

    pub fn remove_peer(&self, connection_id: &ConnectionId) {
        self.inner.peers.remove(connection_id);
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    pub fn send_signal(&self, connection_id: &ConnectionId, msg: SignalMessage) {
        if let Some(peer) = self.inner.peers.get(connection_id) {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {:?}: {:?}", connection_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize signal message: {}", e),
            }
        } else {
            warn!(
                "Attempted to send signal to disconnected user {:?}",
                connection_id
            );
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_roster(&self, to: &ConnectionId, participants: Vec<ParticipantIdentity>) {
        self.send_signal(to, SignalMessage::Roster { participants });
    }

    async fn send_peer_joined(&self, to: &ConnectionId, connection_id: ConnectionId) {
        self.send_signal(to, SignalMessage::PeerJoined { connection_id });
    }

    async fn send_peer_left(&self, to: &ConnectionId, connection_id: ConnectionId) {
        self.send_signal(to, SignalMessage::PeerLeft { connection_id });
    }

    async fn relay(&self, to: &ConnectionId, message: SignalMessage) {
        self.send_signal(to, message);
    }
}
