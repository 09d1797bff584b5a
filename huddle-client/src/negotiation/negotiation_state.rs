/// Lifecycle of the offer/answer exchange with one remote peer.
///
/// ```text
/// New --start_offer--> OfferSent --accept_answer--> Connected
/// New --accept_offer--> Answering --answer created--> Connected
/// any --close--> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    OfferSent,
    Answering,
    Connected,
    Closed,
}

impl NegotiationState {
    /// An offer or answer is being produced and must not be duplicated.
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::OfferSent | Self::Answering)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Initiator,
    Responder,
}
