use crate::media::{LocalStream, RtcRemoteTrack};
use crate::transport::negotiation_transport::{
    NegotiationTransport, SessionDescription, TransportFactory,
};
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::{SessionKey, TransportEvent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use huddle_core::IceCandidatePayload;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::track::track_local::TrackLocal;

/// A `webrtc` peer connection to one remote participant.
pub struct RtcTransport {
    pub key: SessionKey,
    pub peer_connection: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    /// Builds the peer connection, attaches the local tracks and wires the
    /// engine callbacks into `event_tx`.
    pub async fn new(
        key: SessionKey,
        config: &TransportConfig,
        local_stream: &LocalStream,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        // The same local track objects are bound to every peer connection.
        for track in &local_stream.tracks {
            let rtc_track: Arc<dyn TrackLocal + Send + Sync> = track.rtc_track();
            let sender = peer_connection
                .add_track(rtc_track)
                .await
                .with_context(|| format!("Failed to attach local {} track", track.kind()))?;

            // RTCP has to be drained for the interceptors to work.
            tokio::spawn(async move {
                let mut rtcp_buf = vec![0u8; 1500];
                while sender.read(&mut rtcp_buf).await.is_ok() {}
            });
        }

        let state_tx = event_tx.clone();
        let state_key = key.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let id = state_key.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {:?}", id, s);
                    let event = match s {
                        RTCPeerConnectionState::Connected => TransportEvent::Connected(id),
                        RTCPeerConnectionState::Failed => TransportEvent::Disconnected(id),
                        _ => return,
                    };
                    let _ = tx.send(event).await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        let ice_key = key.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let id = ice_key.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Failed to serialize ICE candidate for {}: {}", id, e);
                        return;
                    }
                };
                let payload = IceCandidatePayload {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                };
                let _ = tx.send(TransportEvent::CandidateGenerated(id, payload)).await;
            })
        }));

        let track_tx = event_tx;
        let track_key = key.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let id = track_key.clone();

            Box::pin(async move {
                debug!(
                    "Remote track from {}: kind={}, stream={}",
                    id,
                    track.kind(),
                    track.stream_id()
                );
                let _ = tx
                    .send(TransportEvent::TrackAdded(id, Arc::new(RtcRemoteTrack(track))))
                    .await;
            })
        }));

        Ok(Self {
            key,
            peer_connection,
        })
    }
}

#[async_trait]
impl NegotiationTransport for RtcTransport {
    async fn create_offer(&self) -> Result<String> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        let desc = match description {
            SessionDescription::Offer(sdp) => RTCSessionDescription::offer(sdp)?,
            SessionDescription::Answer(sdp) => RTCSessionDescription::answer(sdp)?,
        };
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidatePayload) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Opens [`RtcTransport`]s.
#[derive(Debug, Clone, Default)]
pub struct RtcTransportFactory;

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn open(
        &self,
        key: SessionKey,
        config: &TransportConfig,
        local_stream: &LocalStream,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn NegotiationTransport>> {
        let transport = RtcTransport::new(key, config, local_stream, event_tx).await?;
        Ok(Box::new(transport))
    }
}
