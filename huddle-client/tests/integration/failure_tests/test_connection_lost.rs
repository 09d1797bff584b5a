use huddle_client::media::TrackKind;
use huddle_client::mesh::InitiatorPolicy;
use huddle_client::negotiation::NegotiationState;
use huddle_client::transport::TransportEvent;
use huddle_client::{CallPhase, SignalEvent};
use huddle_core::ConnectionId;

use crate::integration::{create_test_mesh, init_tracing};
use crate::utils::{fake_track, roster};

#[tokio::test]
async fn test_connection_loss_is_confined_to_one_session() {
    init_tracing();

    let mut carol = create_test_mesh("carol", InitiatorPolicy::JoinOrder);
    let alice = ConnectionId::from("alice");
    let bob = ConnectionId::from("bob");

    carol.coordinator.join().await.expect("Join failed");
    carol
        .coordinator
        .handle_signal(roster(&[("alice", "Alice"), ("bob", "Bob")]))
        .await;
    for remote in [&alice, &bob] {
        carol
            .coordinator
            .handle_signal(SignalEvent::Answer {
                from: remote.clone(),
                sdp: "answer-for-carol".to_string(),
            })
            .await;
        carol
            .coordinator
            .handle_transport_event(TransportEvent::TrackAdded(
                carol.transports.session_key(remote),
                fake_track("a", &format!("{}-stream", remote), TrackKind::Audio),
            ))
            .await;
    }

    carol
        .coordinator
        .handle_transport_event(TransportEvent::Disconnected(
            carol.transports.session_key(&alice),
        ))
        .await;

    assert_eq!(carol.coordinator.phase(), CallPhase::InCall);
    assert_eq!(carol.coordinator.session_state(&alice), None);
    assert_eq!(
        carol.coordinator.session_state(&bob),
        Some(NegotiationState::Connected)
    );
    assert_eq!(carol.coordinator.remote_streams().len(), 1);
    assert_eq!(carol.coordinator.remote_streams()[0].connection_id, bob);

    // No reconnection attempt.
    assert_eq!(carol.transports.calls_for(&alice).opened, 1);
    assert_eq!(carol.transports.calls_for(&alice).offers, 1);
    assert_eq!(carol.transports.calls_for(&alice).closed, 1);

    // The registry still knows Alice until the server says she left.
    assert!(carol.coordinator.registry().contains(&alice));
}

#[tokio::test]
async fn test_disconnect_for_unknown_session_is_ignored() {
    init_tracing();

    let mut carol = create_test_mesh("carol", InitiatorPolicy::JoinOrder);
    let alice = ConnectionId::from("alice");
    carol.coordinator.join().await.expect("Join failed");

    carol
        .coordinator
        .handle_transport_event(TransportEvent::Disconnected(
            carol.transports.session_key(&alice),
        ))
        .await;
    carol
        .coordinator
        .handle_transport_event(TransportEvent::Connected(
            carol.transports.session_key(&alice),
        ))
        .await;

    assert_eq!(carol.coordinator.phase(), CallPhase::InCall);
    assert_eq!(carol.coordinator.session_count(), 0);
}
