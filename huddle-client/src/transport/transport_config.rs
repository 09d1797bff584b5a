use huddle_core::IceServerConfig;
use serde::{Deserialize, Serialize};

/// Settings applied to every peer connection the client opens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec![
                    "stun:stun.l.google.com:19302".to_owned(),
                    "stun:global.stun.twilio.com:3478".to_owned(),
                ],
                username: None,
                credential: None,
            }],
        }
    }
}
