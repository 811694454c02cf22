pub mod connection;
pub mod data_channel;
pub mod engine;
pub mod events;
pub mod token;
pub mod types;

pub use connection::RtcEngine;
pub use engine::NegotiationEngine;
pub use events::{EventReceiver, EventSink, PeerEvent};
pub use token::TokenFormat;
pub use types::{IceServerConfig, SdpType, ServerKind, SessionDescription};
