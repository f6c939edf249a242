//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::{future::Future, net::SocketAddr, time::Duration};

use sessionhub_server::{Hub, ui::serve};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

/// A server on an ephemeral local port, stopped when dropped.
pub struct TestServer {
    addr: SocketAddr,
    hub: Hub,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_hub(Hub::new()).await
    }

    pub async fn start_with_hub(hub: Hub) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let (tx, rx) = oneshot::channel::<()>();

        let server_hub = hub.clone();
        let handle = tokio::spawn(async move {
            serve(listener, server_hub, async {
                let _ = rx.await;
            })
            .await
            .expect("Server failed");
        });

        Self {
            addr,
            hub,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Trigger graceful shutdown and wait for the server task.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Poll `check` every 10ms until it returns true or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
