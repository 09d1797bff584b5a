mod capture_device;
mod local_media;
mod local_track;
mod media_constraints;
mod remote_stream;
mod stream;

pub use capture_device::{CaptureDevice, SampleCaptureDevice};
pub use local_media::LocalMediaSource;
pub use local_track::{LocalStream, LocalTrack};
pub use media_constraints::MediaConstraints;
pub use remote_stream::{RemoteStream, RemoteTrack, RemoteTrackSource, RtcRemoteTrack};
pub use stream::{StreamId, TrackKind};
