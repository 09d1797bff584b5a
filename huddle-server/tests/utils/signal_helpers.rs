use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use huddle_core::{ConnectionId, ParticipantIdentity, RoomId, SignalMessage};
use huddle_server::RoomCommand;

use super::mock_signaling::Outgoing;

/// Timeout for signal exchange operations (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// Time to wait before concluding nothing else is coming (ms).
pub const QUIET_PERIOD_MS: u64 = 100;

pub fn member(name: &str) -> ParticipantIdentity {
    ParticipantIdentity::new(ConnectionId::new(), name, RoomId::from("test-room"))
}

pub async fn join(room_tx: &mpsc::Sender<RoomCommand>, identity: &ParticipantIdentity) -> Result<()> {
    room_tx
        .send(RoomCommand::Join {
            identity: identity.clone(),
        })
        .await
        .context("Room closed")
}

pub async fn announce(room_tx: &mpsc::Sender<RoomCommand>, identity: &ParticipantIdentity) -> Result<()> {
    room_tx
        .send(RoomCommand::AnnouncePresence {
            connection_id: identity.connection_id.clone(),
        })
        .await
        .context("Room closed")
}

/// Waits for the next `count` outgoing messages.
pub async fn collect(rx: &mut mpsc::UnboundedReceiver<Outgoing>, count: usize) -> Result<Vec<Outgoing>> {
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let next = timeout(Duration::from_millis(SIGNAL_TIMEOUT_MS), rx.recv())
            .await
            .context("Timed out waiting for signal")?
            .context("Signal channel closed")?;
        out.push(next);
    }
    Ok(out)
}

/// Asserts the room stays silent for a short while.
pub async fn expect_silence(rx: &mut mpsc::UnboundedReceiver<Outgoing>) {
    if let Ok(Some(out)) = timeout(Duration::from_millis(QUIET_PERIOD_MS), rx.recv()).await {
        panic!("Unexpected signal: {:?}", out);
    }
}

pub fn roster_ids(message: &SignalMessage) -> Vec<ConnectionId> {
    match message {
        SignalMessage::Roster { participants } => participants
            .iter()
            .map(|p| p.connection_id.clone())
            .collect(),
        other => panic!("Expected Roster, got {:?}", other),
    }
}
