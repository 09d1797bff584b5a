use crate::error::MeshResult;
use crate::media::stream::{StreamId, TrackKind};
use anyhow::Context;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use webrtc::media::Sample;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// One captured track. Clones share the engine track and the enabled and
/// stopped flags, so every peer connection the track is bound to sees a
/// toggle immediately. A stopped track stays silent for good.
#[derive(Clone)]
pub struct LocalTrack {
    kind: TrackKind,
    track: Arc<TrackLocalStaticSample>,
    enabled: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
}

impl LocalTrack {
    pub fn new(kind: TrackKind, track: Arc<TrackLocalStaticSample>) -> Self {
        Self {
            kind,
            track,
            enabled: Arc::new(AtomicBool::new(true)),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        self.track.id()
    }

    pub fn rtc_track(&self) -> Arc<TrackLocalStaticSample> {
        Arc::clone(&self.track)
    }

    pub fn is_enabled(&self) -> bool {
        !self.is_stopped() && self.enabled.load(Ordering::Acquire)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Returns `true` when the flag actually changed. Stopped tracks never
    /// change.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.enabled.swap(enabled, Ordering::AcqRel) != enabled
    }

    /// Ends the track for every clone. Returns `false` if it was already
    /// stopped.
    pub fn stop(&self) -> bool {
        !self.stopped.swap(true, Ordering::AcqRel)
    }

    /// Pushes one encoded sample to every bound peer connection.
    /// Samples written while the track is disabled or stopped are dropped.
    pub async fn write_sample(&self, sample: &Sample) -> MeshResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.track
            .write_sample(sample)
            .await
            .with_context(|| format!("Failed to write {} sample", self.kind))?;
        Ok(())
    }
}

/// The local capture as handed to sessions and to the self-preview.
#[derive(Clone)]
pub struct LocalStream {
    pub id: StreamId,
    pub tracks: Vec<LocalTrack>,
}

impl LocalStream {
    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &LocalTrack> {
        self.tracks.iter().filter(move |t| t.kind() == kind)
    }
}

impl std::fmt::Debug for LocalStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStream")
            .field("id", &self.id)
            .field("tracks", &self.tracks.len())
            .finish()
    }
}
