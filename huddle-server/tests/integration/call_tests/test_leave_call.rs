use huddle_core::SignalMessage;
use huddle_server::RoomCommand;

use crate::integration::{create_test_room, init_tracing};
use crate::utils::{announce, collect, expect_silence, join, member, roster_ids};

#[tokio::test]
async fn test_departed_notifies_remaining_members() {
    init_tracing();

    let (room_tx, mut signal_rx, _signaling) = create_test_room();
    let alice = member("Alice");
    let bob = member("Bob");

    join(&room_tx, &alice).await.expect("Join failed");
    join(&room_tx, &bob).await.expect("Join failed");
    announce(&room_tx, &alice).await.expect("Announce failed");
    announce(&room_tx, &bob).await.expect("Announce failed");
    collect(&mut signal_rx, 4).await.expect("Missing signals");

    room_tx
        .send(RoomCommand::Departed {
            connection_id: bob.connection_id.clone(),
        })
        .await
        .expect("Room closed");

    let out = collect(&mut signal_rx, 1).await.expect("No PeerLeft");
    assert_eq!(out[0].to, alice.connection_id);
    assert_eq!(
        out[0].message,
        SignalMessage::PeerLeft {
            connection_id: bob.connection_id.clone()
        }
    );
    expect_silence(&mut signal_rx).await;

    // Bob keeps his membership and can start another call.
    announce(&room_tx, &bob).await.expect("Announce failed");
    let out = collect(&mut signal_rx, 3).await.expect("Missing signals");
    assert_eq!(out[0].to, bob.connection_id);
    assert_eq!(roster_ids(&out[0].message).len(), 2);
}

#[tokio::test]
async fn test_disconnect_removes_member() {
    init_tracing();

    let (room_tx, mut signal_rx, _signaling) = create_test_room();
    let alice = member("Alice");
    let bob = member("Bob");

    join(&room_tx, &alice).await.expect("Join failed");
    join(&room_tx, &bob).await.expect("Join failed");
    announce(&room_tx, &alice).await.expect("Announce failed");
    announce(&room_tx, &bob).await.expect("Announce failed");
    collect(&mut signal_rx, 4).await.expect("Missing signals");

    room_tx
        .send(RoomCommand::Disconnect {
            connection_id: alice.connection_id.clone(),
        })
        .await
        .expect("Room closed");

    let out = collect(&mut signal_rx, 1).await.expect("No PeerLeft");
    assert_eq!(out[0].to, bob.connection_id);
    assert_eq!(
        out[0].message,
        SignalMessage::PeerLeft {
            connection_id: alice.connection_id.clone()
        }
    );

    // Alice is gone from the room: her announce is ignored.
    announce(&room_tx, &alice).await.expect("Announce failed");
    expect_silence(&mut signal_rx).await;
}

#[tokio::test]
async fn test_disconnect_outside_call_is_silent() {
    init_tracing();

    let (room_tx, mut signal_rx, _signaling) = create_test_room();
    let alice = member("Alice");
    let bob = member("Bob");

    join(&room_tx, &alice).await.expect("Join failed");
    join(&room_tx, &bob).await.expect("Join failed");
    announce(&room_tx, &alice).await.expect("Announce failed");
    collect(&mut signal_rx, 1).await.expect("No roster");

    room_tx
        .send(RoomCommand::Disconnect {
            connection_id: bob.connection_id.clone(),
        })
        .await
        .expect("Room closed");
    expect_silence(&mut signal_rx).await;
}
