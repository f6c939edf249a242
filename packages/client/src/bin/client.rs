//! Interactive CLI client for the session hub.
//!
//! Connects to `/ws`, prints every frame the hub sends and forwards each
//! line typed at the prompt as a text frame. `/quit` or Ctrl-D disconnects.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin sessionhub-client -- --url ws://127.0.0.1:8090/ws
//! ```

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use rustyline::{DefaultEditor, error::ReadlineError};
use sessionhub_shared::{logger::setup_logger, time::millis_to_rfc3339};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
};

const QUIT_COMMAND: &str = "/quit";

#[derive(Debug, Parser)]
#[command(version, about = "Interactive client for the session hub")]
struct Args {
    /// WebSocket endpoint of the hub
    #[arg(long, default_value = "ws://127.0.0.1:8090/ws")]
    url: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Error)]
enum ClientError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

/// Human-readable rendering of one text frame from the hub.
fn render_incoming(text: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(text) else {
        return text.to_string();
    };
    if json["type"] != "session-assigned" {
        return text.to_string();
    }

    let session_id = json["session_id"].as_str().unwrap_or("?");
    match json["connected_at"].as_i64().map(millis_to_rfc3339) {
        Some(since) if !since.is_empty() => {
            format!("Connected as session {session_id} (since {since})")
        }
        _ => format!("Connected as session {session_id}"),
    }
}

/// Add `line` to the prompt history. Returns whether it was stored; a
/// failure is logged and otherwise ignored.
fn record_history(editor: &mut DefaultEditor, line: &str) -> bool {
    match editor.add_history_entry(line) {
        Ok(added) => added,
        Err(e) => {
            tracing::debug!("Could not record history entry: {}", e);
            false
        }
    }
}

/// Blocking prompt loop. Runs on its own thread and ends on `/quit`, EOF or
/// when the connection task has gone away.
fn read_lines(tx: mpsc::Sender<String>) -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                record_history(&mut editor, &line);
                let quit = line == QUIT_COMMAND;
                if tx.blocking_send(line).is_err() || quit {
                    return Ok(());
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(()),
            Err(e) => return Err(e),
        }
    }
}

async fn run(url: &str) -> Result<(), ClientError> {
    let (ws, _) = connect_async(url)
        .await
        .map_err(|source| ClientError::Connect {
            url: url.to_string(),
            source,
        })?;
    tracing::info!("Connected to {}", url);

    let (mut sink, mut stream) = ws.split();
    let (line_tx, mut line_rx) = mpsc::channel::<String>(32);

    // Not a spawn_blocking task: the runtime would wait for the prompt on exit
    std::thread::spawn(move || {
        if let Err(e) = read_lines(line_tx) {
            tracing::error!("Prompt failed: {}", e);
        }
    });

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => println!("{}", render_incoming(text.as_str())),
                Some(Ok(Message::Binary(bytes))) => println!("<binary frame, {} bytes>", bytes.len()),
                Some(Ok(Message::Close(_))) | None => {
                    println!("Connection closed by server");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            },
            line = line_rx.recv() => match line {
                Some(line) if line != QUIT_COMMAND => sink.send(Message::text(line)).await?,
                _ => {
                    sink.close().await?;
                    break;
                }
            },
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    if let Err(e) = run(&args.url).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
