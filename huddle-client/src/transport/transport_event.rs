use crate::media::RemoteTrack;
use huddle_core::{ConnectionId, IceCandidatePayload};
use std::fmt;

/// Names the peer connection an event came from: the remote participant and
/// the generation of the session that opened it. A participant who leaves
/// and calls again gets a new generation, so callbacks from the old
/// connection can be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub remote_id: ConnectionId,
    pub generation: u64,
}

impl SessionKey {
    pub fn new(remote_id: ConnectionId, generation: u64) -> Self {
        Self {
            remote_id,
            generation,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.remote_id, self.generation)
    }
}

/// Events a peer connection raises for the coordinator's event loop.
pub enum TransportEvent {
    /// A local ICE candidate was gathered and must be relayed to the remote peer.
    CandidateGenerated(SessionKey, IceCandidatePayload),

    /// The remote peer's media arrived. Fires once per remote track, so the
    /// same stream identity shows up once per track it carries.
    TrackAdded(SessionKey, RemoteTrack),

    /// ICE and DTLS completed.
    Connected(SessionKey),

    /// The connection failed; only this peer's session is affected.
    Disconnected(SessionKey),
}

impl TransportEvent {
    pub fn key(&self) -> &SessionKey {
        match self {
            TransportEvent::CandidateGenerated(key, _)
            | TransportEvent::TrackAdded(key, _)
            | TransportEvent::Connected(key)
            | TransportEvent::Disconnected(key) => key,
        }
    }
}
