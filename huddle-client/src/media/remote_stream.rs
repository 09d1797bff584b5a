use crate::media::stream::{StreamId, TrackKind};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// A track received from a remote peer, as seen by the coordinator.
///
/// Renderers that need the engine object downcast through [`as_any`] to
/// [`RtcRemoteTrack`].
///
/// [`as_any`]: RemoteTrackSource::as_any
pub trait RemoteTrackSource: Send + Sync {
    fn track_id(&self) -> String;
    fn stream_id(&self) -> StreamId;
    fn kind(&self) -> TrackKind;
    fn as_any(&self) -> &dyn Any;
}

pub type RemoteTrack = Arc<dyn RemoteTrackSource>;

/// Remote track delivered by the `webrtc` engine's `on_track` callback.
pub struct RtcRemoteTrack(pub Arc<TrackRemote>);

impl RemoteTrackSource for RtcRemoteTrack {
    fn track_id(&self) -> String {
        self.0.id()
    }

    fn stream_id(&self) -> StreamId {
        StreamId(self.0.stream_id())
    }

    fn kind(&self) -> TrackKind {
        TrackKind::from_codec_type(self.0.kind())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Live handle on a remote media stream.
///
/// Clones share the track list: tracks that arrive after the stream was first
/// resolved show up on every handle, the way a browser `MediaStream` grows.
#[derive(Clone)]
pub struct RemoteStream {
    id: StreamId,
    tracks: Arc<RwLock<Vec<RemoteTrack>>>,
}

impl RemoteStream {
    pub fn new(id: StreamId) -> Self {
        Self {
            id,
            tracks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn id(&self) -> &StreamId {
        &self.id
    }

    pub fn tracks(&self) -> Vec<RemoteTrack> {
        self.tracks.read().clone()
    }

    pub fn has_kind(&self, kind: TrackKind) -> bool {
        self.tracks.read().iter().any(|t| t.kind() == kind)
    }

    /// Returns `false` when a track with the same id is already attached.
    pub(crate) fn add_track(&self, track: RemoteTrack) -> bool {
        let mut tracks = self.tracks.write();
        let track_id = track.track_id();
        if tracks.iter().any(|t| t.track_id() == track_id) {
            return false;
        }
        tracks.push(track);
        true
    }
}

impl fmt::Debug for RemoteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks.read().len())
            .finish()
    }
}
