use super::mock_signaling::{MockSignalingChannel, SentSignal};
use huddle_client::{MeshCoordinator, SignalEvent};
use huddle_core::{ConnectionId, ParticipantIdentity, RoomId};

pub fn identity(id: &str, name: &str) -> ParticipantIdentity {
    ParticipantIdentity::new(ConnectionId::from(id), name, RoomId::from("test-room"))
}

pub fn roster(members: &[(&str, &str)]) -> SignalEvent {
    SignalEvent::Roster(
        members
            .iter()
            .map(|(id, name)| identity(id, name))
            .collect(),
    )
}

/// Converts a captured outgoing signal into the event the addressee would
/// receive from the server.
pub fn as_received(from: &ConnectionId, signal: SentSignal) -> Option<SignalEvent> {
    let event = match signal {
        SentSignal::Offer { sdp, .. } => SignalEvent::Offer {
            from: from.clone(),
            sdp,
        },
        SentSignal::Answer { sdp, .. } => SignalEvent::Answer {
            from: from.clone(),
            sdp,
        },
        SentSignal::Ice { candidate, .. } => SignalEvent::IceCandidate {
            from: from.clone(),
            candidate,
        },
        SentSignal::AnnouncePresence | SentSignal::Departed(_) => return None,
    };
    Some(event)
}

/// Delivers everything `sender` queued for `receiver`. Returns how many
/// events were delivered.
pub async fn relay(
    sender_signaling: &MockSignalingChannel,
    sender: &MeshCoordinator,
    receiver: &mut MeshCoordinator,
) -> usize {
    let pending = sender_signaling.take_for(receiver.local_id()).await;
    let mut delivered = 0;
    for signal in pending {
        if let Some(event) = as_received(sender.local_id(), signal) {
            receiver.handle_signal(event).await;
            delivered += 1;
        }
    }
    delivered
}
