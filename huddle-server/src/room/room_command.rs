use huddle_core::{ConnectionId, ParticipantIdentity, SignalMessage};

/// Commands the websocket side feeds into a room.
#[derive(Debug)]
pub enum RoomCommand {
    /// A socket picked this room. Membership only, not yet in the call.
    Join { identity: ParticipantIdentity },

    /// The member started its call.
    AnnouncePresence { connection_id: ConnectionId },

    /// The member ended its call but keeps its socket.
    Departed { connection_id: ConnectionId },

    /// Offer, answer or ICE candidate addressed to another member.
    Relay {
        from: ConnectionId,
        message: SignalMessage,
    },

    /// The socket closed.
    Disconnect { connection_id: ConnectionId },
}
