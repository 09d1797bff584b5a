use crate::error::{MeshError, MeshResult};
use crate::media::{LocalStream, RemoteStream, RemoteTrack, StreamId};
use crate::negotiation::negotiation_state::{NegotiationRole, NegotiationState};
use crate::transport::{NegotiationTransport, SessionDescription, SessionKey};
use huddle_core::{ConnectionId, IceCandidatePayload};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Negotiation state machine for one remote identity.
///
/// Guarantees that `create_offer`/`create_answer` run at most once, queues
/// trickled candidates until a remote description is installed, and turns
/// remote tracks into stream handles. It does not dedup streams: every track
/// that arrives yields its stream again.
pub struct SessionNegotiator {
    remote_id: ConnectionId,
    generation: u64,
    role: NegotiationRole,
    state: NegotiationState,
    transport: Box<dyn NegotiationTransport>,
    local_stream: LocalStream,
    remote_streams: HashMap<StreamId, RemoteStream>,
    pending_candidates: Vec<IceCandidatePayload>,
    remote_description_set: bool,
}

impl SessionNegotiator {
    pub fn new(
        key: SessionKey,
        role: NegotiationRole,
        transport: Box<dyn NegotiationTransport>,
        local_stream: LocalStream,
    ) -> Self {
        Self {
            remote_id: key.remote_id,
            generation: key.generation,
            role,
            state: NegotiationState::New,
            transport,
            local_stream,
            remote_streams: HashMap::new(),
            pending_candidates: Vec::new(),
            remote_description_set: false,
        }
    }

    pub fn remote_id(&self) -> &ConnectionId {
        &self.remote_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `key` names this session's own peer connection.
    pub fn owns(&self, key: &SessionKey) -> bool {
        key.generation == self.generation && key.remote_id == self.remote_id
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == NegotiationState::Closed
    }

    pub fn local_stream(&self) -> &LocalStream {
        &self.local_stream
    }

    pub fn remote_streams(&self) -> impl Iterator<Item = &RemoteStream> {
        self.remote_streams.values()
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    /// Produces the offer for the remote peer (`New -> OfferSent`).
    pub async fn start_offer(&mut self) -> MeshResult<String> {
        self.ensure_fresh("start an offer")?;
        if self.role != NegotiationRole::Initiator {
            return Err(self.invalid_state("start an offer"));
        }

        self.state = NegotiationState::OfferSent;
        let sdp = self.transport.create_offer().await?;
        info!("Offer created for {:?}", self.remote_id);
        Ok(sdp)
    }

    /// Applies the remote offer and produces our answer
    /// (`New -> Answering -> Connected`).
    pub async fn accept_offer(&mut self, sdp: String) -> MeshResult<String> {
        self.ensure_fresh("answer an offer")?;

        self.state = NegotiationState::Answering;
        self.transport
            .set_remote_description(SessionDescription::Offer(sdp))
            .await?;
        self.remote_description_set = true;
        self.flush_candidates().await;

        let answer = self.transport.create_answer().await?;
        self.state = NegotiationState::Connected;
        info!("Answer created for {:?}", self.remote_id);
        Ok(answer)
    }

    /// Applies the remote answer to our offer (`OfferSent -> Connected`).
    pub async fn accept_answer(&mut self, sdp: String) -> MeshResult<()> {
        match self.state {
            NegotiationState::OfferSent => {}
            NegotiationState::Closed => return Err(MeshError::SessionClosed(self.remote_id.clone())),
            _ => return Err(self.invalid_state("accept an answer")),
        }

        self.transport
            .set_remote_description(SessionDescription::Answer(sdp))
            .await?;
        self.remote_description_set = true;
        self.flush_candidates().await;

        self.state = NegotiationState::Connected;
        info!("Answer from {:?} applied", self.remote_id);
        Ok(())
    }

    /// Applies a trickled candidate, or queues it until a remote description
    /// is installed.
    pub async fn add_remote_candidate(&mut self, candidate: IceCandidatePayload) -> MeshResult<()> {
        if self.is_closed() {
            return Err(MeshError::SessionClosed(self.remote_id.clone()));
        }

        if !self.remote_description_set {
            debug!("Queueing ICE candidate from {:?}", self.remote_id);
            self.pending_candidates.push(candidate);
            return Ok(());
        }

        self.transport.add_ice_candidate(candidate).await?;
        Ok(())
    }

    /// Attaches a remote track to its stream and returns the stream handle.
    /// A closed session resolves nothing.
    pub fn resolve_track(&mut self, track: RemoteTrack) -> Option<RemoteStream> {
        if self.is_closed() {
            return None;
        }

        let mut stream_id = track.stream_id();
        if stream_id.0.is_empty() {
            // No msid from the remote side: one anonymous stream per peer.
            stream_id = StreamId(self.remote_id.to_string());
        }

        let stream = self
            .remote_streams
            .entry(stream_id.clone())
            .or_insert_with(|| RemoteStream::new(stream_id));
        stream.add_track(track);
        Some(stream.clone())
    }

    /// Terminal. Late events for this session are ignored afterwards.
    pub async fn close(&mut self) {
        if self.is_closed() {
            return;
        }

        self.state = NegotiationState::Closed;
        self.pending_candidates.clear();
        self.remote_streams.clear();

        if let Err(e) = self.transport.close().await {
            warn!("Failed to close transport for {:?}: {:?}", self.remote_id, e);
        }
        info!("Session with {:?} closed", self.remote_id);
    }

    fn ensure_fresh(&self, action: &'static str) -> MeshResult<()> {
        match self.state {
            NegotiationState::New => Ok(()),
            state if state.is_in_progress() => {
                Err(MeshError::NegotiationInProgress(self.remote_id.clone()))
            }
            NegotiationState::Closed => Err(MeshError::SessionClosed(self.remote_id.clone())),
            _ => Err(self.invalid_state(action)),
        }
    }

    fn invalid_state(&self, action: &'static str) -> MeshError {
        MeshError::InvalidState {
            remote: self.remote_id.clone(),
            state: self.state,
            action,
        }
    }

    async fn flush_candidates(&mut self) {
        let pending = std::mem::take(&mut self.pending_candidates);
        if pending.is_empty() {
            return;
        }

        debug!(
            "Flushing {} queued candidate(s) for {:?}",
            pending.len(),
            self.remote_id
        );
        for candidate in pending {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                warn!("Failed to add queued ICE candidate for {:?}: {:?}", self.remote_id, e);
            }
        }
    }
}
