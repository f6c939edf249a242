//! Transport adapters implementing the domain's `FrameReader` / `FrameWriter`.

pub mod channel;
pub mod websocket;

pub use channel::{ChannelPeer, ChannelTransport, channel_transport};
pub use websocket::WebSocketTransport;
