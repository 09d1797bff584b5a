use huddle_core::{
    ConnectionId, IceCandidatePayload, IceServerConfig, ParticipantIdentity, SignalMessage,
};

/// Inbound signaling events consumed by the mesh coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalEvent {
    /// Current call members. The first one after announcing presence lists
    /// the participants that were already there.
    Roster(Vec<ParticipantIdentity>),

    PeerJoined(ConnectionId),

    PeerLeft(ConnectionId),

    Offer { from: ConnectionId, sdp: String },

    Answer { from: ConnectionId, sdp: String },

    IceCandidate {
        from: ConnectionId,
        candidate: IceCandidatePayload,
    },

    /// ICE servers pushed by the signaling server.
    IceConfig(Vec<IceServerConfig>),
}

impl SignalEvent {
    /// Maps a server-to-client wire message. Client-to-server messages and
    /// errors have no event counterpart.
    pub fn from_message(msg: SignalMessage) -> Option<Self> {
        let event = match msg {
            SignalMessage::Roster { participants } => Self::Roster(participants),
            SignalMessage::PeerJoined { connection_id } => Self::PeerJoined(connection_id),
            SignalMessage::PeerLeft { connection_id } => Self::PeerLeft(connection_id),
            SignalMessage::Offer { peer, sdp } => Self::Offer { from: peer, sdp },
            SignalMessage::Answer { peer, sdp } => Self::Answer { from: peer, sdp },
            SignalMessage::IceCandidate { peer, candidate } => Self::IceCandidate {
                from: peer,
                candidate,
            },
            SignalMessage::IceConfig { ice_servers } => Self::IceConfig(ice_servers),
            SignalMessage::Welcome { .. }
            | SignalMessage::Join { .. }
            | SignalMessage::AnnouncePresence
            | SignalMessage::Departed { .. }
            | SignalMessage::Error { .. } => return None,
        };
        Some(event)
    }
}
