//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    response::Response,
};

use crate::{
    hub::{Hub, HubError},
    infrastructure::{
        dto::websocket::{MessageType, SessionAssignedMessage},
        transport::WebSocketTransport,
    },
    ui::state::AppState,
};

/// Upgrade `/ws` and hand the socket to the hub.
pub async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, HubError> {
    let ws = ws.map_err(|e| {
        tracing::warn!("Rejected WebSocket request: {}", e);
        HubError::UpgradeFailed(e.body_text())
    })?;

    if !state.hub.is_accepting() {
        return Err(HubError::Rejected("hub is shutting down".to_string()));
    }

    let hub = state.hub.clone();
    Ok(ws
        .on_failed_upgrade(|e| tracing::warn!("WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| handle_socket(socket, hub)))
}

async fn handle_socket(socket: WebSocket, hub: Hub) {
    let session_id = match hub.accept(WebSocketTransport::new(socket)).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Could not accept WebSocket connection: {}", e);
            return;
        }
    };

    // Tell the client its session id. The read loop is already running, so a
    // session closed in the meantime simply misses the greeting.
    let Some(info) = hub.session_info(&session_id).await else {
        return;
    };
    let greeting = SessionAssignedMessage {
        r#type: MessageType::SessionAssigned,
        session_id: session_id.to_string(),
        connected_at: info.connected_at.value(),
    };

    match serde_json::to_string(&greeting) {
        Ok(json) => {
            if let Err(e) = hub.send_to(&session_id, json).await {
                tracing::warn!("Failed to send session greeting to '{}': {}", session_id, e);
            }
        }
        Err(e) => tracing::error!("Failed to serialize session greeting: {}", e),
    }
}
