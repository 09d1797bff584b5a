use async_trait::async_trait;
use huddle_core::{ConnectionId, IceCandidatePayload};

/// Outbound half of the signaling transport.
///
/// Delivery failures are the channel's business: implementations log them,
/// the coordinator never retries.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    /// Tell the room we are in the call and ready to be called.
    async fn announce_presence(&self);

    /// Tell the room we left the call.
    async fn departed(&self, connection_id: ConnectionId);

    async fn send_offer(&self, to: ConnectionId, sdp: String);

    async fn send_answer(&self, to: ConnectionId, sdp: String);

    async fn send_ice(&self, to: ConnectionId, candidate: IceCandidatePayload);
}
