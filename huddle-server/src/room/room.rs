use crate::room::room_command::RoomCommand;
use crate::signaling::SignalingOutput;
use huddle_core::{ConnectionId, ParticipantIdentity, RoomId, SignalMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct Room {
    id: RoomId,
    members: HashMap<ConnectionId, ParticipantIdentity>,
    /// Members currently in the call, in the order they announced.
    call: Vec<ConnectionId>,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Room {
    pub fn new(
        id: RoomId,
        command_rx: mpsc::Receiver<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            id,
            members: HashMap::new(),
            call: Vec::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!("Room {} event loop started", self.id);

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Room {} event loop finished", self.id);
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { identity } => {
                info!(
                    "{:?} ({}) joined room {}",
                    identity.connection_id, identity.display_name, self.id
                );
                self.members.insert(identity.connection_id.clone(), identity);
            }

            RoomCommand::AnnouncePresence { connection_id } => {
                self.announce(connection_id).await;
            }

            RoomCommand::Departed { connection_id } => {
                info!("{:?} ended their call in room {}", connection_id, self.id);
                self.leave_call(&connection_id).await;
            }

            RoomCommand::Relay { from, message } => self.relay(from, message).await,

            RoomCommand::Disconnect { connection_id } => {
                self.leave_call(&connection_id).await;
                if self.members.remove(&connection_id).is_some() {
                    info!("{:?} left room {}", connection_id, self.id);
                }
            }
        }
    }

    async fn announce(&mut self, connection_id: ConnectionId) {
        if !self.members.contains_key(&connection_id) {
            warn!("Presence from non-member {:?} in room {}", connection_id, self.id);
            return;
        }
        if self.call.contains(&connection_id) {
            debug!("{:?} already in the call", connection_id);
            return;
        }

        info!("{:?} started a call in room {}", connection_id, self.id);
        let existing = self.call.clone();
        self.call.push(connection_id.clone());

        // The newcomer learns who is already there; everyone else hears of
        // the newcomer, then all call members get the refreshed roster.
        let roster = self.roster();
        self.signaling
            .send_roster(&connection_id, roster.clone())
            .await;
        for member in &existing {
            self.signaling
                .send_peer_joined(member, connection_id.clone())
                .await;
        }
        for member in &existing {
            self.signaling.send_roster(member, roster.clone()).await;
        }
    }

    async fn leave_call(&mut self, connection_id: &ConnectionId) {
        let before = self.call.len();
        self.call.retain(|id| id != connection_id);
        if before == self.call.len() {
            return;
        }

        for member in &self.call {
            self.signaling
                .send_peer_left(member, connection_id.clone())
                .await;
        }
    }

    async fn relay(&self, from: ConnectionId, message: SignalMessage) {
        if !self.members.contains_key(&from) {
            warn!("Relay from non-member {:?} in room {}", from, self.id);
            return;
        }

        let (to, forwarded) = match message {
            SignalMessage::Offer { peer, sdp } => (peer, SignalMessage::Offer { peer: from, sdp }),
            SignalMessage::Answer { peer, sdp } => {
                (peer, SignalMessage::Answer { peer: from, sdp })
            }
            SignalMessage::IceCandidate { peer, candidate } => (
                peer,
                SignalMessage::IceCandidate {
                    peer: from,
                    candidate,
                },
            ),
            other => {
                warn!("Not relaying {:?}", other);
                return;
            }
        };

        if !self.members.contains_key(&to) {
            debug!("Dropping relay to {:?}: not in room {}", to, self.id);
            return;
        }
        self.signaling.relay(&to, forwarded).await;
    }

    fn roster(&self) -> Vec<ParticipantIdentity> {
        self.call
            .iter()
            .filter_map(|id| self.members.get(id).cloned())
            .collect()
    }
}
