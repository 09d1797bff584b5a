use crate::media::MediaConstraints;
use crate::transport::TransportConfig;
use serde::{Deserialize, Serialize};

/// Decides which side of a peer pair sends the offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiatorPolicy {
    /// The participant that joins later calls everyone listed in the roster
    /// it receives on join; participants already present only answer.
    #[default]
    JoinOrder,

    /// The lexicographically smaller connection id calls, whatever the
    /// order in which the two sides learn about each other.
    LowestIdentity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    pub transport: TransportConfig,
    pub constraints: MediaConstraints,
    pub initiator_policy: InitiatorPolicy,
}
