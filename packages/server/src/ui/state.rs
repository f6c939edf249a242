//! Server state shared by the HTTP and WebSocket handlers.

use crate::hub::Hub;

/// Shared application state
pub struct AppState {
    /// The connection hub every handler talks to
    pub hub: Hub,
}

impl AppState {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }
}
