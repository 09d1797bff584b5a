mod participant;
mod room;
mod signaling;

pub use participant::{ConnectionId, ParticipantIdentity};
pub use room::RoomId;
pub use signaling::{IceCandidatePayload, IceServerConfig, SignalMessage};
