use crate::error::{MeshError, MeshResult};
use crate::media::{LocalMediaSource, LocalStream, RemoteStream, RemoteTrack, TrackKind};
use crate::mesh::call_phase::CallPhase;
use crate::mesh::mesh_command::MeshCommand;
use crate::mesh::mesh_config::{InitiatorPolicy, MeshConfig};
use crate::mesh::mesh_view::MeshView;
use crate::mesh::remote_stream_record::RemoteStreamRecord;
use crate::negotiation::{NegotiationRole, NegotiationState, SessionNegotiator};
use crate::registry::PeerRegistry;
use crate::signaling::{SignalEvent, SignalingChannel};
use crate::transport::{SessionKey, TransportEvent, TransportFactory};
use huddle_core::{ConnectionId, IceCandidatePayload, ParticipantIdentity};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Owns every negotiation session and every visible remote stream of the
/// local participant, and reacts to user actions, signaling events and
/// transport events one at a time.
pub struct MeshCoordinator {
    local_id: ConnectionId,
    config: MeshConfig,
    phase: CallPhase,

    /// Set on join until the "existing users" roster has been handled.
    awaiting_roster: bool,

    registry: PeerRegistry,
    media: LocalMediaSource,
    sessions: HashMap<ConnectionId, SessionNegotiator>,
    /// Generation handed to the next session; never reused.
    next_generation: u64,
    streams: Vec<RemoteStreamRecord>,

    signaling: Arc<dyn SignalingChannel>,
    transports: Arc<dyn TransportFactory>,
    transport_tx: mpsc::Sender<TransportEvent>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    view_tx: watch::Sender<MeshView>,
}

impl MeshCoordinator {
    pub fn new(
        local_id: ConnectionId,
        config: MeshConfig,
        signaling: Arc<dyn SignalingChannel>,
        transports: Arc<dyn TransportFactory>,
        media: LocalMediaSource,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);
        let (view_tx, _) = watch::channel(MeshView::default());

        Self {
            local_id,
            config,
            phase: CallPhase::Idle,
            awaiting_roster: false,
            registry: PeerRegistry::new(),
            media,
            sessions: HashMap::new(),
            next_generation: 1,
            streams: Vec::new(),
            signaling,
            transports,
            transport_tx,
            transport_rx,
            view_tx,
        }
    }

    pub fn local_id(&self) -> &ConnectionId {
        &self.local_id
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn phase(&self) -> CallPhase {
        self.phase
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn local_stream(&self) -> Option<&LocalStream> {
        self.media.stream()
    }

    pub fn remote_streams(&self) -> &[RemoteStreamRecord] {
        &self.streams
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_state(&self, remote_id: &ConnectionId) -> Option<NegotiationState> {
        self.sessions.get(remote_id).map(|s| s.state())
    }

    pub fn session_key(&self, remote_id: &ConnectionId) -> Option<SessionKey> {
        self.sessions
            .get(remote_id)
            .map(|s| SessionKey::new(remote_id.clone(), s.generation()))
    }

    pub fn session_role(&self, remote_id: &ConnectionId) -> Option<NegotiationRole> {
        self.sessions.get(remote_id).map(|s| s.role())
    }

    pub fn subscribe(&self) -> watch::Receiver<MeshView> {
        self.view_tx.subscribe()
    }

    /// Event loop. Ends when the command side is dropped or the signaling
    /// connection goes away; either way the call is torn down first.
    pub async fn run(
        mut self,
        mut signal_rx: mpsc::Receiver<SignalEvent>,
        mut command_rx: mpsc::Receiver<MeshCommand>,
    ) {
        info!("Mesh event loop started for {:?}", self.local_id);

        loop {
            tokio::select! {
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down mesh.");
                            break;
                        }
                    }
                }

                evt = signal_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_signal(e).await,
                        None => {
                            warn!("Signaling channel closed");
                            break;
                        }
                    }
                }

                evt = self.transport_rx.recv() => {
                    if let Some(e) = evt {
                        self.handle_transport_event(e).await;
                    }
                }
            }
        }

        self.end_call().await;
        info!("Mesh event loop finished");
    }

    pub async fn handle_command(&mut self, cmd: MeshCommand) {
        match cmd {
            MeshCommand::Join { reply } => {
                let result = self.join().await;
                let _ = reply.send(result);
            }
            MeshCommand::EndCall { reply } => {
                self.end_call().await;
                let _ = reply.send(());
            }
            MeshCommand::SetTrackEnabled {
                kind,
                enabled,
                reply,
            } => {
                let _ = reply.send(self.set_track_enabled(kind, enabled));
            }
        }
    }

    /// `Idle -> InCall`. A media failure leaves the phase at `Idle` and is
    /// returned to the caller. Joining while in a call is a no-op.
    pub async fn join(&mut self) -> MeshResult<()> {
        if self.phase == CallPhase::InCall {
            debug!("Already in a call");
            return Ok(());
        }

        let stream = match self.media.acquire(&self.config.constraints).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Join aborted: {}", e);
                return Err(e);
            }
        };

        info!("Joined call as {:?} (stream {})", self.local_id, stream.id);
        self.phase = CallPhase::InCall;
        self.awaiting_roster = true;
        self.signaling.announce_presence().await;
        self.publish();
        Ok(())
    }

    /// Closes every session, releases local media and announces the
    /// departure once. No-op while `Idle`.
    pub async fn end_call(&mut self) {
        if self.phase == CallPhase::Idle {
            debug!("end_call while idle ignored");
            return;
        }

        for (_, mut session) in self.sessions.drain() {
            session.close().await;
        }
        self.media.release().await;
        self.streams.clear();
        self.phase = CallPhase::Idle;
        self.awaiting_roster = false;

        self.signaling.departed(self.local_id.clone()).await;
        info!("Left call as {:?}", self.local_id);
        self.publish();
    }

    /// Mute / camera toggle on the shared local tracks. No session sees a
    /// new offer or answer.
    pub fn set_track_enabled(&mut self, kind: TrackKind, enabled: bool) -> bool {
        self.media.set_track_enabled(kind, enabled)
    }

    pub async fn handle_signal(&mut self, event: SignalEvent) {
        match event {
            SignalEvent::Roster(participants) => self.on_roster(participants).await,
            SignalEvent::PeerJoined(id) => self.on_peer_joined(id).await,
            SignalEvent::PeerLeft(id) => self.on_peer_left(id).await,
            SignalEvent::Offer { from, sdp } => self.on_offer(from, sdp).await,
            SignalEvent::Answer { from, sdp } => self.on_answer(from, sdp).await,
            SignalEvent::IceCandidate { from, candidate } => {
                self.on_remote_candidate(from, candidate).await
            }
            SignalEvent::IceConfig(ice_servers) => {
                info!("Using {} ICE server(s) from signaling", ice_servers.len());
                self.config.transport.ice_servers = ice_servers;
            }
        }
    }

    /// Events from a peer connection whose session has been closed or
    /// replaced are dropped.
    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        let live = match self.sessions.get(&event.key().remote_id) {
            Some(session) => session.owns(event.key()) && !session.is_closed(),
            None => false,
        };
        if !live {
            debug!("Dropping event from stale connection {}", event.key());
            return;
        }

        match event {
            TransportEvent::CandidateGenerated(key, candidate) => {
                self.signaling.send_ice(key.remote_id, candidate).await;
            }

            TransportEvent::TrackAdded(key, track) => self.on_track(key.remote_id, track),

            TransportEvent::Connected(key) => {
                info!("Media connected with {}", key);
            }

            TransportEvent::Disconnected(key) => {
                warn!("{}", MeshError::ConnectionLost(key.remote_id.clone()));
                self.fail_session(&key.remote_id).await;
            }
        }
    }

    async fn on_roster(&mut self, participants: Vec<ParticipantIdentity>) {
        let listed: Vec<ConnectionId> = participants
            .iter()
            .map(|p| p.connection_id.clone())
            .filter(|id| *id != self.local_id)
            .collect();

        self.registry.apply_roster_snapshot(participants);
        if self.refresh_display_names() {
            self.publish();
        }

        if self.phase != CallPhase::InCall {
            return;
        }

        let join_roster = std::mem::take(&mut self.awaiting_roster);
        let targets: Vec<ConnectionId> = match self.config.initiator_policy {
            InitiatorPolicy::JoinOrder if join_roster => listed,
            InitiatorPolicy::JoinOrder => Vec::new(),
            InitiatorPolicy::LowestIdentity => listed
                .into_iter()
                .filter(|id| self.local_id < *id)
                .collect(),
        };

        for remote_id in targets {
            self.initiate(remote_id).await;
        }
    }

    async fn on_peer_joined(&mut self, remote_id: ConnectionId) {
        if self.phase != CallPhase::InCall || remote_id == self.local_id {
            return;
        }

        match self.config.initiator_policy {
            InitiatorPolicy::JoinOrder => {
                debug!("{:?} joined the call, waiting for their offer", remote_id);
            }
            InitiatorPolicy::LowestIdentity if self.local_id < remote_id => {
                self.initiate(remote_id).await;
            }
            InitiatorPolicy::LowestIdentity => {
                debug!("{:?} joined the call and will call us", remote_id);
            }
        }
    }

    async fn on_peer_left(&mut self, remote_id: ConnectionId) {
        self.registry.remove(&remote_id);

        let had_session = match self.sessions.remove(&remote_id) {
            Some(mut session) => {
                session.close().await;
                true
            }
            None => false,
        };
        let had_streams = self.remove_streams_of(&remote_id);

        if had_session || had_streams {
            info!("{:?} left the call", remote_id);
            self.publish();
        }
    }

    async fn on_offer(&mut self, from: ConnectionId, sdp: String) {
        if self.phase != CallPhase::InCall {
            debug!("Ignoring offer from {:?}: not in a call", from);
            return;
        }

        if !self.sessions.contains_key(&from) {
            let Some(session) = self.open_session(from.clone(), NegotiationRole::Responder).await
            else {
                return;
            };
            self.sessions.insert(from.clone(), session);
        }

        let Some(session) = self.sessions.get_mut(&from) else {
            return;
        };
        match session.accept_offer(sdp).await {
            Ok(answer) => self.signaling.send_answer(from, answer).await,
            Err(e) if is_rejection(&e) => warn!("Rejected offer from {:?}: {}", from, e),
            Err(e) => {
                error!("Failed to answer {:?}: {}", from, e);
                self.fail_session(&from).await;
            }
        }
    }

    async fn on_answer(&mut self, from: ConnectionId, sdp: String) {
        let Some(session) = self.sessions.get_mut(&from) else {
            debug!("Discarding answer: {}", MeshError::SessionNotFound(from));
            return;
        };

        match session.accept_answer(sdp).await {
            Ok(()) => {}
            Err(e) if is_rejection(&e) => warn!("Rejected answer from {:?}: {}", from, e),
            Err(e) => {
                error!("Failed to apply answer from {:?}: {}", from, e);
                self.fail_session(&from).await;
            }
        }
    }

    async fn on_remote_candidate(&mut self, from: ConnectionId, candidate: IceCandidatePayload) {
        let Some(session) = self.sessions.get_mut(&from) else {
            debug!("Discarding candidate: {}", MeshError::SessionNotFound(from));
            return;
        };

        if let Err(e) = session.add_remote_candidate(candidate).await {
            warn!("Failed to add ICE candidate from {:?}: {}", from, e);
        }
    }

    fn on_track(&mut self, remote_id: ConnectionId, track: RemoteTrack) {
        let Some(session) = self.sessions.get_mut(&remote_id) else {
            debug!("Discarding track: {}", MeshError::SessionNotFound(remote_id));
            return;
        };
        let Some(stream) = session.resolve_track(track) else {
            return;
        };
        self.on_remote_stream(remote_id, stream);
    }

    /// Idempotent upsert keyed by stream identity.
    fn on_remote_stream(&mut self, remote_id: ConnectionId, stream: RemoteStream) {
        if self.streams.iter().any(|r| r.stream_id == *stream.id()) {
            debug!("Stream {} from {:?} already visible", stream.id(), remote_id);
            return;
        }

        let display_name = self.registry.display_name(&remote_id);
        info!(
            "Remote stream {} from {:?} ({:?})",
            stream.id(),
            remote_id,
            display_name
        );
        self.streams.push(RemoteStreamRecord {
            stream_id: stream.id().clone(),
            connection_id: remote_id,
            display_name,
            stream,
        });
        self.publish();
    }

    async fn initiate(&mut self, remote_id: ConnectionId) {
        if self.sessions.contains_key(&remote_id) {
            debug!("Session with {:?} already exists, not calling", remote_id);
            return;
        }

        let Some(session) = self
            .open_session(remote_id.clone(), NegotiationRole::Initiator)
            .await
        else {
            return;
        };
        self.sessions.insert(remote_id.clone(), session);

        let Some(session) = self.sessions.get_mut(&remote_id) else {
            return;
        };
        match session.start_offer().await {
            Ok(sdp) => {
                info!("Calling {:?}", remote_id);
                self.signaling.send_offer(remote_id, sdp).await;
            }
            Err(e) => {
                error!("Failed to create offer for {:?}: {}", remote_id, e);
                self.fail_session(&remote_id).await;
            }
        }
    }

    async fn open_session(
        &mut self,
        remote_id: ConnectionId,
        role: NegotiationRole,
    ) -> Option<SessionNegotiator> {
        let Some(local_stream) = self.media.stream().cloned() else {
            warn!("No local stream, cannot negotiate with {:?}", remote_id);
            return None;
        };

        let key = SessionKey::new(remote_id.clone(), self.next_generation);
        self.next_generation += 1;

        let transport = self
            .transports
            .open(
                key.clone(),
                &self.config.transport,
                &local_stream,
                self.transport_tx.clone(),
            )
            .await;

        match transport {
            Ok(transport) => Some(SessionNegotiator::new(
                key,
                role,
                transport,
                local_stream,
            )),
            Err(e) => {
                error!("Failed to create transport for {:?}: {:?}", remote_id, e);
                None
            }
        }
    }

    /// Closes one failed session and drops its streams. Other sessions and
    /// the call phase are untouched; there is no reconnection.
    async fn fail_session(&mut self, remote_id: &ConnectionId) {
        if let Some(mut session) = self.sessions.remove(remote_id) {
            session.close().await;
        }
        self.remove_streams_of(remote_id);
        self.publish();
    }

    fn remove_streams_of(&mut self, remote_id: &ConnectionId) -> bool {
        let before = self.streams.len();
        self.streams.retain(|r| r.connection_id != *remote_id);
        before != self.streams.len()
    }

    fn refresh_display_names(&mut self) -> bool {
        let mut changed = false;
        for record in &mut self.streams {
            let Some(identity) = self.registry.lookup(&record.connection_id) else {
                continue;
            };
            if identity.display_name != record.display_name {
                record.display_name = identity.display_name.clone();
                changed = true;
            }
        }
        changed
    }

    fn publish(&self) {
        self.view_tx.send_replace(MeshView {
            phase: self.phase,
            local_stream: self.media.stream().cloned(),
            participants: self.streams.clone(),
        });
    }
}

/// State-machine refusals leave the session as it is; anything else means
/// the transport broke.
fn is_rejection(e: &MeshError) -> bool {
    matches!(
        e,
        MeshError::NegotiationInProgress(_)
            | MeshError::InvalidState { .. }
            | MeshError::SessionClosed(_)
    )
}
