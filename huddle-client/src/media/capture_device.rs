use crate::error::{MeshError, MeshResult};
use crate::media::local_track::LocalTrack;
use crate::media::media_constraints::MediaConstraints;
use crate::media::stream::{StreamId, TrackKind};
use async_trait::async_trait;
use std::sync::Arc;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Hardware side of the local capture.
///
/// `open` is called once per join and must either hand back every requested
/// track or fail with [`MeshError::MediaAccessDenied`] /
/// [`MeshError::MediaUnavailable`].
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn open(
        &self,
        stream_id: &StreamId,
        constraints: &MediaConstraints,
    ) -> MeshResult<Vec<LocalTrack>>;

    /// Stop capturing and free the hardware.
    async fn close(&self);
}

/// Capture backed by application-fed sample tracks (VP8 video, Opus audio).
///
/// The embedding application encodes frames itself and pushes them through
/// [`LocalTrack::write_sample`].
#[derive(Debug, Clone)]
pub struct SampleCaptureDevice {
    available: MediaConstraints,
}

impl SampleCaptureDevice {
    pub fn new() -> Self {
        Self {
            available: MediaConstraints::default(),
        }
    }

    /// Restrict which kinds this device can produce (e.g. a host without a camera).
    pub fn with_available(available: MediaConstraints) -> Self {
        Self { available }
    }

    fn codec_for(kind: TrackKind) -> RTCRtpCodecCapability {
        match kind {
            TrackKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            TrackKind::Video => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
        }
    }
}

impl Default for SampleCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureDevice for SampleCaptureDevice {
    async fn open(
        &self,
        stream_id: &StreamId,
        constraints: &MediaConstraints,
    ) -> MeshResult<Vec<LocalTrack>> {
        if constraints.is_empty() {
            return Err(MeshError::MediaUnavailable(
                "no audio or video requested".to_owned(),
            ));
        }

        let mut tracks = Vec::new();
        for kind in [TrackKind::Audio, TrackKind::Video] {
            if !constraints.wants(kind) {
                continue;
            }
            if !self.available.wants(kind) {
                return Err(MeshError::MediaUnavailable(format!("no {kind} device")));
            }

            let track = Arc::new(TrackLocalStaticSample::new(
                Self::codec_for(kind),
                kind.to_string(),
                stream_id.0.clone(),
            ));
            tracks.push(LocalTrack::new(kind, track));
        }

        Ok(tracks)
    }

    async fn close(&self) {}
}
