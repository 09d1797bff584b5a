use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable per-connection identity token handed out by the signaling server.
///
/// The token is opaque to clients. It is ordered so that a deterministic
/// initiator can be picked for a pair of peers.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConnectionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ConnectionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who is behind a connection, as announced through roster broadcasts.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
pub struct ParticipantIdentity {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub room_id: RoomId,
}

impl ParticipantIdentity {
    pub fn new(
        connection_id: ConnectionId,
        display_name: impl Into<String>,
        room_id: RoomId,
    ) -> Self {
        Self {
            connection_id,
            display_name: display_name.into(),
            room_id,
        }
    }
}
