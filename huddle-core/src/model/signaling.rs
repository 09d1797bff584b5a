use crate::model::participant::{ConnectionId, ParticipantIdentity};
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// A trickle ICE candidate in the browser's `RTCIceCandidateInit` shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceCandidatePayload {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

/// Every message exchanged over the signaling websocket.
///
/// For `Offer`, `Answer` and `IceCandidate` the `peer` field names the target
/// when a client sends the message and the source once the server relays it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "d")]
pub enum SignalMessage {
    Welcome {
        connection_id: ConnectionId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Join {
        room: RoomId,
        display_name: String,
    },
    AnnouncePresence,
    Departed {
        connection_id: ConnectionId,
    },
    Roster {
        participants: Vec<ParticipantIdentity>,
    },
    PeerJoined {
        connection_id: ConnectionId,
    },
    PeerLeft {
        connection_id: ConnectionId,
    },
    Offer {
        peer: ConnectionId,
        sdp: String,
    },
    Answer {
        peer: ConnectionId,
        sdp: String,
    },
    IceCandidate {
        peer: ConnectionId,
        candidate: IceCandidatePayload,
    },
    Error {
        message: String,
    },
}
