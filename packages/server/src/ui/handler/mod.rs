//! Handler modules for HTTP and WebSocket endpoints.

pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{broadcast, close_session, health_check, list_sessions, send_to_session};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
