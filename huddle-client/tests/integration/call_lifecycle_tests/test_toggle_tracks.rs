use huddle_client::mesh::InitiatorPolicy;
use huddle_client::media::TrackKind;
use huddle_core::ConnectionId;

use crate::integration::{create_test_mesh, init_tracing};
use crate::utils::roster;

#[tokio::test]
async fn test_mute_does_not_renegotiate() {
    init_tracing();

    let mut alice = create_test_mesh("alice", InitiatorPolicy::JoinOrder);
    let bob = ConnectionId::from("bob");
    alice.coordinator.join().await.expect("Join failed");
    alice.coordinator.handle_signal(roster(&[("bob", "Bob")])).await;
    let signals_before = alice.signaling.signals().await.len();

    assert!(alice.coordinator.set_track_enabled(TrackKind::Audio, false));
    assert!(!alice.coordinator.set_track_enabled(TrackKind::Audio, false));

    let stream = alice
        .coordinator
        .local_stream()
        .expect("Local stream missing")
        .clone();
    assert!(stream.tracks_of(TrackKind::Audio).all(|t| !t.is_enabled()));
    assert!(stream.tracks_of(TrackKind::Video).all(|t| t.is_enabled()));

    assert_eq!(alice.signaling.signals().await.len(), signals_before);
    assert_eq!(alice.transports.calls_for(&bob).offers, 1);

    assert!(alice.coordinator.set_track_enabled(TrackKind::Audio, true));
}

#[tokio::test]
async fn test_toggle_without_call_changes_nothing() {
    init_tracing();

    let mut alice = create_test_mesh("alice", InitiatorPolicy::JoinOrder);

    assert!(!alice.coordinator.set_track_enabled(TrackKind::Video, false));
}
