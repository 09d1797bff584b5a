use crate::error::MeshResult;
use crate::media::TrackKind;
use tokio::sync::oneshot;

/// User actions delivered to the coordinator's event loop.
#[derive(Debug)]
pub enum MeshCommand {
    Join {
        reply: oneshot::Sender<MeshResult<()>>,
    },

    EndCall {
        reply: oneshot::Sender<()>,
    },

    /// Mute / camera toggle. Never renegotiates.
    SetTrackEnabled {
        kind: TrackKind,
        enabled: bool,
        reply: oneshot::Sender<bool>,
    },
}
