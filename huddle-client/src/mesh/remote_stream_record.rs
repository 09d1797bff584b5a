use crate::media::{RemoteStream, StreamId};
use huddle_core::ConnectionId;

/// One visible remote participant stream. Unique by `stream_id`.
#[derive(Debug, Clone)]
pub struct RemoteStreamRecord {
    pub stream_id: StreamId,
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub stream: RemoteStream,
}
