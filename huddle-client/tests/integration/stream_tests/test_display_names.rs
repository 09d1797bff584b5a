use huddle_client::media::TrackKind;
use huddle_client::mesh::InitiatorPolicy;
use huddle_client::transport::TransportEvent;
use huddle_core::ConnectionId;

use crate::integration::{create_test_mesh, init_tracing};
use crate::utils::{fake_track, roster};

#[tokio::test]
async fn test_unknown_name_renders_empty_then_refreshes() {
    init_tracing();

    let mut alice = create_test_mesh("alice", InitiatorPolicy::LowestIdentity);
    let bob = ConnectionId::from("bob");
    let view = alice.coordinator.subscribe();
    alice.coordinator.join().await.expect("Join failed");

    // Bob calls before any roster names him.
    alice
        .coordinator
        .handle_signal(huddle_client::SignalEvent::Offer {
            from: bob.clone(),
            sdp: "offer-for-alice".to_string(),
        })
        .await;
    alice
        .coordinator
        .handle_transport_event(TransportEvent::TrackAdded(
            alice.transports.session_key(&bob),
            fake_track("v", "bob-stream", TrackKind::Video),
        ))
        .await;
    assert_eq!(alice.coordinator.remote_streams()[0].display_name, "");

    alice
        .coordinator
        .handle_signal(roster(&[("alice", "Alice"), ("bob", "Bob")]))
        .await;

    assert_eq!(alice.coordinator.remote_streams()[0].display_name, "Bob");
    assert_eq!(view.borrow().participants[0].display_name, "Bob");
    assert_eq!(
        alice.coordinator.registry().display_name(&bob),
        "Bob".to_string()
    );
}

#[tokio::test]
async fn test_rename_in_roster_updates_record() {
    init_tracing();

    let mut alice = create_test_mesh("alice", InitiatorPolicy::JoinOrder);
    let bob = ConnectionId::from("bob");
    alice.coordinator.join().await.expect("Join failed");
    alice.coordinator.handle_signal(roster(&[("bob", "Bob")])).await;
    alice
        .coordinator
        .handle_transport_event(TransportEvent::TrackAdded(
            alice.transports.session_key(&bob),
            fake_track("v", "bob-stream", TrackKind::Video),
        ))
        .await;

    alice
        .coordinator
        .handle_signal(roster(&[("bob", "Robert")]))
        .await;

    assert_eq!(alice.coordinator.remote_streams()[0].display_name, "Robert");
}
