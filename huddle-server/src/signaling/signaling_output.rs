use async_trait::async_trait;
use huddle_core::{ConnectionId, ParticipantIdentity, SignalMessage};

/// Outbound side of the signaling server as seen by a room.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Current call members of the room, sent to one member.
    async fn send_roster(&self, to: &ConnectionId, participants: Vec<ParticipantIdentity>);

    async fn send_peer_joined(&self, to: &ConnectionId, connection_id: ConnectionId);

    async fn send_peer_left(&self, to: &ConnectionId, connection_id: ConnectionId);

    /// Forward an offer, answer or ICE candidate whose `peer` already names
    /// the sender.
    async fn relay(&self, to: &ConnectionId, message: SignalMessage);
}
