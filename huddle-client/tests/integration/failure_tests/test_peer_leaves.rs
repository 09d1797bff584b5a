use huddle_client::media::TrackKind;
use huddle_client::mesh::InitiatorPolicy;
use huddle_client::negotiation::NegotiationState;
use huddle_client::transport::TransportEvent;
use huddle_client::{CallPhase, SignalEvent};
use huddle_core::ConnectionId;

use crate::integration::{create_test_mesh, init_tracing};
use crate::utils::{fake_track, relay, roster};

#[tokio::test]
async fn test_peer_leaving_removes_only_their_stream() {
    init_tracing();

    let mut carol = create_test_mesh("carol", InitiatorPolicy::JoinOrder);
    let alice = ConnectionId::from("alice");
    let bob = ConnectionId::from("bob");
    let view = carol.coordinator.subscribe();

    carol.coordinator.join().await.expect("Join failed");
    carol
        .coordinator
        .handle_signal(roster(&[("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")]))
        .await;
    for remote in [&alice, &bob] {
        carol
            .coordinator
            .handle_transport_event(TransportEvent::TrackAdded(
                carol.transports.session_key(remote),
                fake_track("v", &format!("{}-stream", remote), TrackKind::Video),
            ))
            .await;
    }
    assert_eq!(carol.coordinator.remote_streams().len(), 2);

    carol
        .coordinator
        .handle_signal(SignalEvent::PeerLeft(alice.clone()))
        .await;

    assert_eq!(carol.coordinator.phase(), CallPhase::InCall);
    assert_eq!(carol.coordinator.session_state(&alice), None);
    assert_eq!(
        carol.coordinator.session_state(&bob),
        Some(NegotiationState::OfferSent)
    );
    assert_eq!(carol.transports.calls_for(&alice).closed, 1);
    assert_eq!(carol.transports.calls_for(&bob).closed, 0);
    assert!(!carol.coordinator.registry().contains(&alice));

    let names: Vec<_> = view
        .borrow()
        .participants
        .iter()
        .map(|r| r.connection_id.clone())
        .collect();
    assert_eq!(names, vec![bob]);
}

#[tokio::test]
async fn test_remaining_peer_stays_in_call() {
    init_tracing();

    let mut alice = create_test_mesh("alice", InitiatorPolicy::JoinOrder);
    let mut bob = create_test_mesh("bob", InitiatorPolicy::JoinOrder);

    alice.coordinator.join().await.expect("Alice join failed");
    alice.coordinator.handle_signal(roster(&[("alice", "Alice")])).await;
    bob.coordinator.join().await.expect("Bob join failed");
    bob.coordinator
        .handle_signal(roster(&[("alice", "Alice"), ("bob", "Bob")]))
        .await;
    relay(&bob.signaling, &bob.coordinator, &mut alice.coordinator).await;
    relay(&alice.signaling, &alice.coordinator, &mut bob.coordinator).await;

    // Alice hangs up; the server tells Bob.
    alice.coordinator.end_call().await;
    bob.coordinator
        .handle_signal(SignalEvent::PeerLeft(alice.id()))
        .await;

    assert_eq!(bob.coordinator.phase(), CallPhase::InCall);
    assert_eq!(bob.coordinator.session_count(), 0);
    assert!(bob.coordinator.local_stream().is_some());
    assert_eq!(bob.signaling.departures().await, 0);
}

#[tokio::test]
async fn test_unknown_peer_left_is_noop() {
    init_tracing();

    let mut alice = create_test_mesh("alice", InitiatorPolicy::JoinOrder);
    let view = alice.coordinator.subscribe();
    alice.coordinator.join().await.expect("Join failed");
    let version = view.borrow().participants.len();

    alice
        .coordinator
        .handle_signal(SignalEvent::PeerLeft(ConnectionId::from("ghost")))
        .await;

    assert_eq!(alice.coordinator.phase(), CallPhase::InCall);
    assert_eq!(view.borrow().participants.len(), version);
}
