use crate::error::MeshResult;
use crate::media::capture_device::CaptureDevice;
use crate::media::local_track::LocalStream;
use crate::media::media_constraints::MediaConstraints;
use crate::media::stream::{StreamId, TrackKind};
use tracing::{debug, info};
use uuid::Uuid;

/// Owns the local capture handle for the lifetime of one call.
pub struct LocalMediaSource {
    device: Box<dyn CaptureDevice>,
    stream: Option<LocalStream>,
}

impl LocalMediaSource {
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        Self {
            device,
            stream: None,
        }
    }

    pub fn stream(&self) -> Option<&LocalStream> {
        self.stream.as_ref()
    }

    /// Opens the capture device. Acquiring twice hands back the live stream.
    pub async fn acquire(&mut self, constraints: &MediaConstraints) -> MeshResult<LocalStream> {
        if let Some(stream) = &self.stream {
            return Ok(stream.clone());
        }

        let stream_id = StreamId(Uuid::new_v4().to_string());
        let tracks = self.device.open(&stream_id, constraints).await?;
        info!(
            "Local media acquired: stream {} with {} track(s)",
            stream_id,
            tracks.len()
        );

        let stream = LocalStream {
            id: stream_id,
            tracks,
        };
        self.stream = Some(stream.clone());
        Ok(stream)
    }

    /// Stops every track and frees the device. No-op when nothing is held.
    pub async fn release(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        for track in &stream.tracks {
            track.stop();
        }
        self.device.close().await;
        info!("Local media released: stream {}", stream.id);
    }

    /// Flips the enabled flag of every track of `kind` without touching any
    /// peer connection. Returns `true` when at least one track changed.
    pub fn set_track_enabled(&self, kind: TrackKind, enabled: bool) -> bool {
        let Some(stream) = &self.stream else {
            return false;
        };

        let mut changed = false;
        for track in stream.tracks_of(kind) {
            changed |= track.set_enabled(enabled);
        }
        debug!("Local {} tracks enabled={} (changed={})", kind, enabled, changed);
        changed
    }
}
