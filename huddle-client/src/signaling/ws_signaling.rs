use crate::signaling::signal_event::SignalEvent;
use crate::signaling::signaling_channel::SignalingChannel;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use huddle_core::{
    ConnectionId, IceCandidatePayload, IceServerConfig, RoomId, SignalMessage,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};
use url::Url;

/// Signaling over the `huddle-server` websocket endpoint.
#[derive(Clone)]
pub struct WsSignalingChannel {
    outgoing: mpsc::UnboundedSender<SignalMessage>,
}

/// Everything a freshly connected client needs to build its coordinator.
pub struct SignalingSession {
    pub channel: Arc<WsSignalingChannel>,
    pub local_id: ConnectionId,
    /// ICE servers announced by the server before `Welcome`, if any.
    pub ice_servers: Option<Vec<IceServerConfig>>,
    pub events: mpsc::Receiver<SignalEvent>,
}

impl WsSignalingChannel {
    /// Connects, joins `room` and waits for the server to assign our
    /// connection id.
    pub async fn connect(url: &str, room: RoomId, display_name: &str) -> Result<SignalingSession> {
        let url = Url::parse(url).context("Invalid signaling URL")?;
        let (socket, _) = connect_async(url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;
        info!("Signaling connected to {}", url);

        let (mut sink, mut stream) = socket.split();

        let join = SignalMessage::Join {
            room,
            display_name: display_name.to_owned(),
        };
        sink.send(Message::Text(serde_json::to_string(&join)?.into()))
            .await
            .context("Failed to send Join")?;

        let mut ice_servers = None;
        let local_id = loop {
            let msg = stream
                .next()
                .await
                .context("Signaling closed before Welcome")?
                .context("Signaling read failed")?;
            let Message::Text(text) = msg else { continue };

            match serde_json::from_str::<SignalMessage>(text.as_str()) {
                Ok(SignalMessage::Welcome { connection_id }) => break connection_id,
                Ok(SignalMessage::IceConfig { ice_servers: servers }) => {
                    ice_servers = Some(servers);
                }
                Ok(SignalMessage::Error { message }) => {
                    anyhow::bail!("Signaling server refused join: {}", message)
                }
                Ok(other) => debug!("Ignoring {:?} before Welcome", other),
                Err(e) => warn!("Invalid SignalMessage before Welcome: {:?}", e),
            }
        };
        info!("Assigned connection id {:?}", local_id);

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SignalMessage>();
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize signal message: {}", e);
                        continue;
                    }
                };
                if sink.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let (event_tx, event_rx) = mpsc::channel(256);
        tokio::spawn(async move {
            while let Some(Ok(msg)) = stream.next().await {
                match msg {
                    Message::Text(text) => {
                        match serde_json::from_str::<SignalMessage>(text.as_str()) {
                            Ok(SignalMessage::Error { message }) => {
                                warn!("Signaling server error: {}", message)
                            }
                            Ok(signal) => {
                                let Some(event) = SignalEvent::from_message(signal) else {
                                    continue;
                                };
                                if event_tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Invalid SignalMessage from server: {:?}", e),
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            info!("Signaling connection closed");
        });

        Ok(SignalingSession {
            channel: Arc::new(Self { outgoing: out_tx }),
            local_id,
            ice_servers,
            events: event_rx,
        })
    }

    fn send(&self, msg: SignalMessage) {
        if self.outgoing.send(msg).is_err() {
            warn!("Signaling connection closed, dropping outgoing message");
        }
    }
}

#[async_trait]
impl SignalingChannel for WsSignalingChannel {
    async fn announce_presence(&self) {
        self.send(SignalMessage::AnnouncePresence);
    }

    async fn departed(&self, connection_id: ConnectionId) {
        self.send(SignalMessage::Departed { connection_id });
    }

    async fn send_offer(&self, to: ConnectionId, sdp: String) {
        self.send(SignalMessage::Offer { peer: to, sdp });
    }

    async fn send_answer(&self, to: ConnectionId, sdp: String) {
        self.send(SignalMessage::Answer { peer: to, sdp });
    }

    async fn send_ice(&self, to: ConnectionId, candidate: IceCandidatePayload) {
        self.send(SignalMessage::IceCandidate {
            peer: to,
            candidate,
        });
    }
}
