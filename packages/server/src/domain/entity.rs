//! Core domain models for the connection hub.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use tokio::{
    sync::{Mutex, Notify},
    time::timeout,
};

use super::{
    error::TransportError,
    transport::FrameWriter,
    value_object::{Frame, SessionId, Timestamp},
};

/// How long a single write (or close) may take, lock wait included.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// One live duplex connection, addressed by its session id.
///
/// Any number of callers may write to a connection at the same time; the
/// write half sits behind a per-connection lock so frames never interleave.
/// The read half is not stored here: it belongs to the session's read loop.
///
/// Every transport operation is bounded by the write timeout, so a peer that
/// stops reading can only delay callers by that much.
pub struct Connection {
    id: SessionId,
    connected_at: Timestamp,
    writer: Mutex<Box<dyn FrameWriter>>,
    write_timeout: Duration,
    alive: AtomicBool,
    close_requested: Notify,
}

impl Connection {
    /// Create a new live connection
    pub fn new(id: SessionId, connected_at: Timestamp, writer: Box<dyn FrameWriter>) -> Self {
        Self {
            id,
            connected_at,
            writer: Mutex::new(writer),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            alive: AtomicBool::new(true),
            close_requested: Notify::new(),
        }
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// `false` once the transport has been released.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Write one frame to the peer.
    ///
    /// A write that does not finish within the write timeout (waiting for
    /// the lock included) is abandoned and the read loop is asked to close
    /// the session: a peer that stopped reading is treated as gone.
    ///
    /// # Errors
    ///
    /// `TransportError::Closed` if the transport was already released,
    /// `TransportError::TimedOut` on a stalled write, or whatever the
    /// underlying writer reports.
    pub async fn send(&self, frame: Frame) -> Result<(), TransportError> {
        if !self.is_alive() {
            return Err(TransportError::Closed);
        }

        let write = async {
            let mut writer = self.writer.lock().await;
            // release() may have won the lock while we were waiting
            if !self.is_alive() {
                return Err(TransportError::Closed);
            }
            writer.write_frame(frame).await
        };

        match timeout(self.write_timeout, write).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Write to session '{}' stalled for {:?}, closing it",
                    self.id,
                    self.write_timeout
                );
                self.request_close();
                Err(TransportError::TimedOut(self.write_timeout))
            }
        }
    }

    /// Ask the read loop to stop. Returns immediately; cleanup happens on the
    /// read loop's task.
    pub fn request_close(&self) {
        // notify_one stores a permit, so a request made before the read loop
        // starts waiting is not lost
        self.close_requested.notify_one();
    }

    /// Resolves once `request_close` has been called.
    pub async fn close_requested(&self) {
        self.close_requested.notified().await;
    }

    /// Mark the connection dead and close its transport.
    ///
    /// Only the first call closes the writer; later calls return `Ok(())`.
    /// Gives up after the write timeout if the writer is stuck; the transport
    /// is then dropped together with the connection.
    pub async fn release(&self) -> Result<(), TransportError> {
        if !self.alive.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let close = async {
            let mut writer = self.writer.lock().await;
            writer.close().await
        };

        timeout(self.write_timeout, close)
            .await
            .unwrap_or(Err(TransportError::TimedOut(self.write_timeout)))
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("connected_at", &self.connected_at)
            .field("write_timeout", &self.write_timeout)
            .field("alive", &self.is_alive())
            .finish()
    }
}
