//! Session-addressable WebSocket connection hub.
//!
//! Accepts duplex connections, gives each a unique [`SessionId`], keeps a
//! concurrency-safe registry of live sessions and offers unicast, broadcast
//! and a pluggable inbound handler through the [`Hub`] façade.
//!
//! [`SessionId`]: domain::SessionId

pub mod domain;
pub mod hub;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use hub::{Hub, HubError, SessionInfo, WeakHub};
pub use ui::{ServerConfig, run};
