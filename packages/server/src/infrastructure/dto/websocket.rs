//! WebSocket message DTOs sent by the hub itself.

use serde::{Deserialize, Serialize};

/// Message type enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    SessionAssigned,
}

/// Greeting sent to a client right after its session is registered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAssignedMessage {
    pub r#type: MessageType,
    pub session_id: String,
    /// Unix timestamp (milliseconds since epoch), UTC
    pub connected_at: i64,
}
