//! Full-mesh audio/video calls: one `webrtc` peer connection per remote
//! participant, coordinated over a signaling channel.
//!
//! [`MeshCoordinator`] is the entry point. It owns the local capture
//! ([`LocalMediaSource`]), one [`SessionNegotiator`] per remote peer and the
//! list of visible remote streams, and publishes [`MeshView`] snapshots for
//! rendering.

pub mod error;
pub mod media;
pub mod mesh;
pub mod negotiation;
pub mod registry;
pub mod signaling;
pub mod transport;

pub use error::{MeshError, MeshResult};
pub use media::LocalMediaSource;
pub use mesh::{CallPhase, MeshConfig, MeshCoordinator, MeshHandle, MeshView, RemoteStreamRecord};
pub use negotiation::SessionNegotiator;
pub use registry::PeerRegistry;
pub use signaling::{SignalEvent, SignalingChannel};
