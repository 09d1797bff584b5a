use crate::media::LocalStream;
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::{SessionKey, TransportEvent};
use anyhow::Result;
use async_trait::async_trait;
use huddle_core::IceCandidatePayload;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionDescription {
    Offer(String),
    Answer(String),
}

/// The offer/answer/ICE primitive of one peer connection.
///
/// Callbacks (gathered candidates, remote tracks, state changes) are not part
/// of this trait: implementations push them as [`TransportEvent`]s into the
/// sender they were opened with.
#[async_trait]
pub trait NegotiationTransport: Send + Sync {
    /// Creates an offer and installs it as the local description.
    async fn create_offer(&self) -> Result<String>;

    /// Creates an answer to the remote offer and installs it as the local description.
    async fn create_answer(&self) -> Result<String>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidatePayload) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Opens one peer connection per session, with the local stream already
/// attached. Every event the connection raises carries `key`.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn open(
        &self,
        key: SessionKey,
        config: &TransportConfig,
        local_stream: &LocalStream,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn NegotiationTransport>>;
}
