use huddle_core::{ConnectionId, ParticipantIdentity};
use std::collections::HashMap;
use tracing::debug;

/// Known participants, keyed by connection id.
///
/// Pure bookkeeping: nothing here triggers negotiation. Lookups for
/// identities that were never announced are expected (an offer can beat the
/// roster) and simply come back empty.
#[derive(Debug, Default, Clone)]
pub struct PeerRegistry {
    participants: HashMap<ConnectionId, ParticipantIdentity>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole known set with `snapshot`.
    pub fn apply_roster_snapshot(&mut self, snapshot: Vec<ParticipantIdentity>) {
        self.participants = snapshot
            .into_iter()
            .map(|p| (p.connection_id.clone(), p))
            .collect();
        debug!("Roster applied: {} participant(s)", self.participants.len());
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ParticipantIdentity> {
        self.participants.remove(connection_id)
    }

    pub fn lookup(&self, connection_id: &ConnectionId) -> Option<&ParticipantIdentity> {
        self.participants.get(connection_id)
    }

    /// Display name for rendering; empty when the identity is unknown.
    pub fn display_name(&self, connection_id: &ConnectionId) -> String {
        self.lookup(connection_id)
            .map(|p| p.display_name.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.participants.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
