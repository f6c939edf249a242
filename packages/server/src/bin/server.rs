//! Session hub server.
//!
//! Accepts WebSocket connections on `/ws`, assigns each a session id and logs
//! every inbound frame. With `--echo`, frames are also written back to the
//! session that sent them.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin sessionhub-server -- --port 8090 --echo
//! ```

use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use sessionhub_server::{
    Hub, ServerConfig, WeakHub,
    domain::{Frame, SessionId},
    usecase::{HandlerError, InboundHandler},
};
use sessionhub_shared::logger::setup_logger;

#[derive(Debug, Parser)]
#[command(version, about = "Session-addressable WebSocket hub")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8090)]
    port: u16,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,

    /// Echo every inbound frame back to its sender
    #[arg(long)]
    echo: bool,

    /// Seconds a write to one session may stall before that session is closed
    #[arg(long, default_value_t = 10)]
    write_timeout_secs: u64,
}

/// Writes each inbound frame back to the session it came from.
struct EchoHandler {
    hub: WeakHub,
}

#[async_trait]
impl InboundHandler for EchoHandler {
    async fn on_message(&self, session_id: &SessionId, frame: Frame) -> Result<(), HandlerError> {
        tracing::info!("Message received from {}: {}", session_id, frame);
        let Some(hub) = self.hub.upgrade() else {
            return Ok(());
        };
        hub.send_to(session_id, frame)
            .await
            .map_err(|e| HandlerError::new(e.to_string()))
    }
}

fn log_message(session_id: &SessionId, frame: Frame) -> Result<(), HandlerError> {
    tracing::info!("Message received from {}: {}", session_id, frame);
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let hub = Hub::with_write_timeout(Duration::from_secs(args.write_timeout_secs));
    if args.echo {
        hub.set_inbound_handler(EchoHandler {
            hub: hub.downgrade(),
        });
    } else {
        hub.set_inbound_handler(log_message);
    }

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };

    // Run the server
    if let Err(e) = sessionhub_server::run(config, hub).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
