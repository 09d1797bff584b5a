mod negotiation_transport;
mod rtc_transport;
mod transport_config;
mod transport_event;

pub use negotiation_transport::{NegotiationTransport, SessionDescription, TransportFactory};
pub use rtc_transport::{RtcTransport, RtcTransportFactory};
pub use transport_config::TransportConfig;
pub use transport_event::{SessionKey, TransportEvent};
