use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use huddle_client::media::TrackKind;
use huddle_client::mesh::InitiatorPolicy;
use huddle_client::{CallPhase, MeshError, MeshView, SignalEvent};
use huddle_core::ConnectionId;

use crate::integration::{create_test_mesh, init_tracing};
use crate::utils::roster;

async fn wait_for_view(
    view: &mut watch::Receiver<MeshView>,
    condition: impl Fn(&MeshView) -> bool,
) -> MeshView {
    timeout(Duration::from_secs(5), async {
        loop {
            if condition(&view.borrow_and_update()) {
                return view.borrow().clone();
            }
            view.changed().await.expect("Coordinator dropped the view");
        }
    })
    .await
    .expect("Timed out waiting for view")
}

#[tokio::test]
async fn test_handle_drives_the_coordinator() {
    init_tracing();

    let mesh = create_test_mesh("alice", InitiatorPolicy::JoinOrder);
    let signaling = mesh.signaling.clone();
    let transports = mesh.transports.clone();
    let (signal_tx, signal_rx) = mpsc::channel::<SignalEvent>(16);

    let handle = mesh.coordinator.spawn(signal_rx);
    assert_eq!(handle.local_id(), &ConnectionId::from("alice"));
    let mut view = handle.subscribe();

    handle.join().await.expect("Join failed");
    let snapshot = wait_for_view(&mut view, |v| v.phase == CallPhase::InCall).await;
    assert!(snapshot.local_stream.is_some());

    signal_tx
        .send(roster(&[("alice", "Alice"), ("bob", "Bob")]))
        .await
        .expect("Send failed");

    let bob = ConnectionId::from("bob");
    timeout(Duration::from_secs(5), async {
        while signaling.offers_to(&bob).await.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("No offer sent to bob");
    assert_eq!(transports.calls_for(&bob).offers, 1);

    assert!(
        handle
            .set_track_enabled(TrackKind::Video, false)
            .await
            .expect("Toggle failed")
    );

    handle.end_call().await.expect("End call failed");
    assert_eq!(handle.view().phase, CallPhase::Idle);
    assert_eq!(signaling.departures().await, 1);
    assert_eq!(transports.calls_for(&bob).closed, 1);
}

#[tokio::test]
async fn test_signaling_loss_ends_the_call() {
    init_tracing();

    let mesh = create_test_mesh("alice", InitiatorPolicy::JoinOrder);
    let signaling = mesh.signaling.clone();
    let (signal_tx, signal_rx) = mpsc::channel::<SignalEvent>(16);

    let handle = mesh.coordinator.spawn(signal_rx);
    let mut view = handle.subscribe();
    handle.join().await.expect("Join failed");
    wait_for_view(&mut view, |v| v.phase == CallPhase::InCall).await;

    drop(signal_tx);

    wait_for_view(&mut view, |v| v.phase == CallPhase::Idle).await;
    assert_eq!(signaling.departures().await, 1);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match handle.end_call().await {
                Err(e) => return e,
                Ok(()) => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
    })
    .await
    .expect("Coordinator kept running");
    assert!(matches!(result, MeshError::CoordinatorStopped));
}

#[tokio::test]
async fn test_connect_with_bad_url_is_a_signaling_error() {
    init_tracing();

    let result = huddle_client::MeshHandle::connect(
        "not a url",
        huddle_core::RoomId::from("standup"),
        "Alice",
        huddle_client::MeshConfig::default(),
        Box::new(crate::utils::MockCaptureDevice::new()),
    )
    .await;

    assert!(matches!(result, Err(MeshError::Signaling(_))));
}
