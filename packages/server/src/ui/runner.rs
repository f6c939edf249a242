//! Router construction and server lifecycle.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{delete, get, post},
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    hub::Hub,
    ui::{handler, signal::shutdown_signal, state::AppState},
};

/// Listen address settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Errors that stop the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Build the router: `/ws` plus the administrative `/api` endpoints.
pub fn create_router(hub: Hub) -> Router {
    let state = Arc::new(AppState::new(hub));

    Router::new()
        .route("/ws", get(handler::websocket_handler))
        .route("/api/health", get(handler::health_check))
        .route("/api/sessions", get(handler::list_sessions))
        .route("/api/sessions/{session_id}", delete(handler::close_session))
        .route(
            "/api/sessions/{session_id}/messages",
            post(handler::send_to_session),
        )
        .route("/api/broadcast", post(handler::broadcast))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// On shutdown the hub closes every session first, so upgraded connections
/// do not hold the HTTP server open.
pub async fn serve<F>(listener: TcpListener, hub: Hub, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);

    let app = create_router(hub.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            hub.shutdown().await;
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Bind `config`'s address and serve until Ctrl-C / SIGTERM.
pub async fn run(config: ServerConfig, hub: Hub) -> Result<(), ServerError> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    serve(listener, hub, shutdown_signal()).await
}
