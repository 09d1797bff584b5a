use crate::media::LocalStream;
use crate::mesh::call_phase::CallPhase;
use crate::mesh::remote_stream_record::RemoteStreamRecord;

/// Read-only snapshot for the rendering layer: the self-preview plus the
/// remote participants in arrival order.
#[derive(Debug, Clone, Default)]
pub struct MeshView {
    pub phase: CallPhase,
    pub local_stream: Option<LocalStream>,
    pub participants: Vec<RemoteStreamRecord>,
}
