//! HTTP API request / response DTOs for the administrative surface.

use serde::{Deserialize, Serialize};

/// Live session entry for the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummaryDto {
    pub session_id: String,
    pub connected_at: String, // ISO 8601
}

/// Body of the unicast and broadcast endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequestDto {
    pub content: String,
}

/// Aggregate result of a broadcast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResultDto {
    pub delivered: usize,
    pub failed: Vec<DeliveryFailureDto>,
}

/// One session a broadcast could not reach
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryFailureDto {
    pub session_id: String,
    pub reason: String,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
}
