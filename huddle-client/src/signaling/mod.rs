mod signal_event;
mod signaling_channel;
mod ws_signaling;

pub use signal_event::SignalEvent;
pub use signaling_channel::SignalingChannel;
pub use ws_signaling::{SignalingSession, WsSignalingChannel};
