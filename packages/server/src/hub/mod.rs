//! Hub façade: the public entry point of the connection hub.
//!
//! A [`Hub`] owns its registry; there is no process-wide connection table, so
//! any number of independent hubs can live side by side.
//!
//! ```no_run
//! use sessionhub_server::{Hub, domain::{Frame, SessionId}, usecase::HandlerError};
//!
//! # async fn demo(transport: sessionhub_server::infrastructure::transport::ChannelTransport) {
//! let hub = Hub::new();
//! hub.set_inbound_handler(|id: &SessionId, frame: Frame| -> Result<(), HandlerError> {
//!     println!("{id}: {frame}");
//!     Ok(())
//! });
//! let id = hub.accept(transport).await.unwrap();
//! hub.send_to(&id, "welcome").await.unwrap();
//! hub.broadcast("hello everyone").await;
//! # }
//! ```

mod error;

use std::{
    fmt,
    future::Future,
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tokio::{sync::Mutex, task::JoinSet};

pub use error::HubError;

use crate::{
    domain::{Frame, SessionId, SessionRepository, Timestamp, Transport},
    infrastructure::repository::InMemorySessionRepository,
    usecase::{
        BroadcastMessageUseCase, BroadcastReport, CloseSessionUseCase, ConnectSessionUseCase,
        DisconnectSessionUseCase, Dispatcher, InboundHandler, SendMessageUseCase,
    },
};

/// Administrative view of one live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub connected_at: Timestamp,
}

struct HubInner {
    repository: Arc<dyn SessionRepository>,
    dispatcher: Dispatcher,
    accepting: AtomicBool,
    /// One task per live connection
    read_loops: Mutex<JoinSet<()>>,
}

/// Session-addressable connection hub. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

/// Non-owning handle to a [`Hub`], for handlers that need to send without
/// keeping the hub alive.
#[derive(Clone)]
pub struct WeakHub {
    inner: Weak<HubInner>,
}

impl WeakHub {
    pub fn upgrade(&self) -> Option<Hub> {
        self.inner.upgrade().map(|inner| Hub { inner })
    }
}

impl Hub {
    /// Create a hub backed by an in-memory registry.
    pub fn new() -> Self {
        Self::with_repository(Arc::new(InMemorySessionRepository::new()))
    }

    /// Create a hub whose writes (and closes) give up after `write_timeout`.
    pub fn with_write_timeout(write_timeout: Duration) -> Self {
        Self::with_repository(Arc::new(
            InMemorySessionRepository::new().with_write_timeout(write_timeout),
        ))
    }

    pub fn with_repository(repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            inner: Arc::new(HubInner {
                repository,
                dispatcher: Dispatcher::new(),
                accepting: AtomicBool::new(true),
                read_loops: Mutex::new(JoinSet::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakHub {
        WeakHub {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Install the handler called for every inbound frame of every session.
    /// Calling it again replaces the previous handler.
    ///
    /// The handler runs on the session's read-loop task. It must not await
    /// [`shutdown`](Self::shutdown), which waits for that very task; spawn
    /// it instead.
    pub fn set_inbound_handler<H>(&self, handler: H)
    where
        H: InboundHandler + 'static,
    {
        self.inner.dispatcher.set_handler(Arc::new(handler));
    }

    pub fn is_accepting(&self) -> bool {
        self.inner.accepting.load(Ordering::Acquire)
    }

    /// Register an upgraded connection and start its read loop.
    ///
    /// Registration completes before this returns, so the returned id is
    /// immediately addressable; the read loop runs on its own task.
    ///
    /// # Errors
    ///
    /// `HubError::Rejected` when the hub is shutting down or no unique id
    /// could be minted. The transport is dropped in that case.
    pub async fn accept<T: Transport>(&self, transport: T) -> Result<SessionId, HubError> {
        // Held across registration so shutdown cannot miss a session that is
        // being accepted concurrently
        let mut read_loops = self.inner.read_loops.lock().await;
        if !self.is_accepting() {
            return Err(HubError::Rejected("hub is shutting down".to_string()));
        }

        let (mut reader, writer) = transport.into_split();
        let connection = ConnectSessionUseCase::new(self.inner.repository.clone())
            .execute(writer)
            .await?;
        let session_id = connection.id();

        // Reap finished read loops so the set only tracks live ones
        while read_loops.try_join_next().is_some() {}

        let inner = self.inner.clone();
        read_loops.spawn(async move {
            let reason = inner
                .dispatcher
                .run_read_loop(&connection, reader.as_mut())
                .await;
            DisconnectSessionUseCase::new(inner.repository.clone())
                .execute(&connection, &reason)
                .await;
        });

        Ok(session_id)
    }

    /// Await an external upgrade, then [`accept`](Self::accept) its result.
    ///
    /// # Errors
    ///
    /// `HubError::UpgradeFailed` if the upgrade fails; nothing is registered.
    pub async fn accept_upgrade<F, T, E>(&self, upgrade: F) -> Result<SessionId, HubError>
    where
        F: Future<Output = Result<T, E>>,
        T: Transport,
        E: fmt::Display,
    {
        let transport = upgrade.await.map_err(|e| {
            tracing::warn!("Upgrade failed: {}", e);
            HubError::UpgradeFailed(e.to_string())
        })?;
        self.accept(transport).await
    }

    /// Deliver one frame to one session.
    ///
    /// # Errors
    ///
    /// `HubError::NotFound` if the session is gone, `HubError::DeliveryFailed`
    /// if the write failed. Both mean "not delivered".
    pub async fn send_to(
        &self,
        session_id: &SessionId,
        frame: impl Into<Frame>,
    ) -> Result<(), HubError> {
        SendMessageUseCase::new(self.inner.repository.clone())
            .execute(session_id, frame.into())
            .await
            .map_err(HubError::from)
    }

    /// Deliver one frame to every session registered at call time.
    pub async fn broadcast(&self, frame: impl Into<Frame>) -> BroadcastReport {
        BroadcastMessageUseCase::new(self.inner.repository.clone())
            .execute(frame.into())
            .await
    }

    pub async fn session_ids(&self) -> Vec<SessionId> {
        self.inner
            .repository
            .snapshot()
            .await
            .into_iter()
            .map(|(session_id, _)| session_id)
            .collect()
    }

    pub async fn sessions(&self) -> Vec<SessionInfo> {
        self.inner
            .repository
            .snapshot()
            .await
            .into_iter()
            .map(|(session_id, connection)| SessionInfo {
                session_id,
                connected_at: connection.connected_at(),
            })
            .collect()
    }

    pub async fn session_info(&self, session_id: &SessionId) -> Option<SessionInfo> {
        self.inner
            .repository
            .lookup(session_id)
            .await
            .map(|connection| SessionInfo {
                session_id: *session_id,
                connected_at: connection.connected_at(),
            })
    }

    pub async fn session_count(&self) -> usize {
        self.inner.repository.count().await
    }

    pub async fn is_live(&self, session_id: &SessionId) -> bool {
        self.inner.repository.lookup(session_id).await.is_some()
    }

    /// Force-close one session. The session disappears once its read loop
    /// has finished cleaning up.
    pub async fn close_session(&self, session_id: &SessionId) -> Result<(), HubError> {
        CloseSessionUseCase::new(self.inner.repository.clone())
            .execute(session_id)
            .await
            .map_err(HubError::from)
    }

    /// Stop accepting, close every session and wait for all read loops to
    /// finish. Safe to call more than once; a second call does not wait for
    /// the read loops the first one is already joining.
    pub async fn shutdown(&self) {
        self.inner.accepting.store(false, Ordering::Release);

        // Taking the set under the lock waits out any accept that is still
        // registering; later accepts see `accepting == false`. The lock is
        // not held while joining, so accepts from handlers fail fast.
        let mut read_loops = {
            let mut guard = self.inner.read_loops.lock().await;
            std::mem::replace(&mut *guard, JoinSet::new())
        };
        let signalled = CloseSessionUseCase::new(self.inner.repository.clone())
            .execute_all()
            .await;
        tracing::info!("Hub shutting down, closing {} sessions", signalled);

        while let Some(result) = read_loops.join_next().await {
            if let Err(e) = result {
                tracing::error!("Read loop task failed: {}", e);
            }
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hub")
            .field("accepting", &self.is_accepting())
            .finish_non_exhaustive()
    }
}
