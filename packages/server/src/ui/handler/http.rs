//! HTTP API endpoint handlers (administrative surface).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sessionhub_shared::time::millis_to_rfc3339;

use crate::{
    domain::SessionId,
    hub::HubError,
    infrastructure::dto::http::{
        BroadcastResultDto, DeliveryFailureDto, SendMessageRequestDto, SessionSummaryDto,
    },
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// List live sessions, oldest first
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummaryDto>> {
    let sessions = state
        .hub
        .sessions()
        .await
        .into_iter()
        .map(|info| SessionSummaryDto {
            session_id: info.session_id.to_string(),
            connected_at: millis_to_rfc3339(info.connected_at.value()),
        })
        .collect();

    Json(sessions)
}

/// Force-close a session
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, HubError> {
    let session_id = SessionId::parse(&session_id)?;
    state.hub.close_session(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Send a text frame to one session
pub async fn send_to_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(body): Json<SendMessageRequestDto>,
) -> Result<StatusCode, HubError> {
    let session_id = SessionId::parse(&session_id)?;
    state.hub.send_to(&session_id, body.content).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Send a text frame to every live session
pub async fn broadcast(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendMessageRequestDto>,
) -> Json<BroadcastResultDto> {
    let report = state.hub.broadcast(body.content).await;

    Json(BroadcastResultDto {
        delivered: report.delivered.len(),
        failed: report
            .failed
            .into_iter()
            .map(|(session_id, e)| DeliveryFailureDto {
                session_id: session_id.to_string(),
                reason: e.to_string(),
            })
            .collect(),
    })
}
