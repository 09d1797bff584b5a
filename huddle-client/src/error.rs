use crate::negotiation::NegotiationState;
use huddle_core::ConnectionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    /// The user or the operating system refused access to the capture device.
    #[error("media access denied: {0}")]
    MediaAccessDenied(String),

    /// No capture device can satisfy the requested constraints.
    #[error("media unavailable: {0}")]
    MediaUnavailable(String),

    /// An offer or answer is already being produced for this peer.
    #[error("negotiation with {0} already in progress")]
    NegotiationInProgress(ConnectionId),

    #[error("session with {remote} cannot {action} in state {state:?}")]
    InvalidState {
        remote: ConnectionId,
        state: NegotiationState,
        action: &'static str,
    },

    #[error("session with {0} is closed")]
    SessionClosed(ConnectionId),

    #[error("no session with {0}")]
    SessionNotFound(ConnectionId),

    #[error("connection to {0} lost")]
    ConnectionLost(ConnectionId),

    #[error("signaling failure: {0}")]
    Signaling(String),

    #[error("mesh coordinator is no longer running")]
    CoordinatorStopped,

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

pub type MeshResult<T> = Result<T, MeshError>;
