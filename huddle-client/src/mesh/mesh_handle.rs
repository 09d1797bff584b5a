use crate::error::{MeshError, MeshResult};
use crate::media::{CaptureDevice, LocalMediaSource, TrackKind};
use crate::mesh::coordinator::MeshCoordinator;
use crate::mesh::mesh_command::MeshCommand;
use crate::mesh::mesh_config::MeshConfig;
use crate::mesh::mesh_view::MeshView;
use crate::signaling::{SignalEvent, WsSignalingChannel};
use crate::transport::RtcTransportFactory;
use huddle_core::{ConnectionId, RoomId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Cloneable front door to a running [`MeshCoordinator`].
#[derive(Clone)]
pub struct MeshHandle {
    local_id: ConnectionId,
    command_tx: mpsc::Sender<MeshCommand>,
    view_rx: watch::Receiver<MeshView>,
}

impl MeshCoordinator {
    /// Moves the coordinator onto its own task.
    pub fn spawn(self, signal_rx: mpsc::Receiver<SignalEvent>) -> MeshHandle {
        let (command_tx, command_rx) = mpsc::channel(32);
        let handle = MeshHandle {
            local_id: self.local_id().clone(),
            command_tx,
            view_rx: self.subscribe(),
        };

        tokio::spawn(self.run(signal_rx, command_rx));
        handle
    }
}

impl MeshHandle {
    /// Connects to a `huddle-server`, joins `room` and starts a coordinator
    /// backed by `webrtc` peer connections. The call itself starts with
    /// [`MeshHandle::join`]. Connection failures surface as
    /// [`MeshError::Signaling`].
    pub async fn connect(
        url: &str,
        room: RoomId,
        display_name: &str,
        mut config: MeshConfig,
        device: Box<dyn CaptureDevice>,
    ) -> MeshResult<Self> {
        let session = WsSignalingChannel::connect(url, room, display_name)
            .await
            .map_err(|e| MeshError::Signaling(format!("{:#}", e)))?;
        if let Some(ice_servers) = session.ice_servers {
            config.transport.ice_servers = ice_servers;
        }

        let coordinator = MeshCoordinator::new(
            session.local_id,
            config,
            session.channel,
            Arc::new(RtcTransportFactory),
            LocalMediaSource::new(device),
        );
        Ok(coordinator.spawn(session.events))
    }

    pub fn local_id(&self) -> &ConnectionId {
        &self.local_id
    }

    pub async fn join(&self) -> MeshResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(MeshCommand::Join { reply }).await?;
        rx.await.map_err(|_| MeshError::CoordinatorStopped)?
    }

    pub async fn end_call(&self) -> MeshResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(MeshCommand::EndCall { reply }).await?;
        rx.await.map_err(|_| MeshError::CoordinatorStopped)
    }

    /// Returns whether any track actually changed.
    pub async fn set_track_enabled(&self, kind: TrackKind, enabled: bool) -> MeshResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(MeshCommand::SetTrackEnabled {
            kind,
            enabled,
            reply,
        })
        .await?;
        rx.await.map_err(|_| MeshError::CoordinatorStopped)
    }

    pub fn view(&self) -> MeshView {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MeshView> {
        self.view_rx.clone()
    }

    async fn send(&self, cmd: MeshCommand) -> MeshResult<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| MeshError::CoordinatorStopped)
    }
}
