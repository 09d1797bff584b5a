mod negotiation_state;
mod session_negotiator;

pub use negotiation_state::{NegotiationRole, NegotiationState};
pub use session_negotiator::SessionNegotiator;
