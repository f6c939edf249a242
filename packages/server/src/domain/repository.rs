//! Session registry abstraction.
//!
//! The UseCase layer depends on this trait only; the concrete store lives in
//! the infrastructure layer (dependency inversion).

use std::sync::Arc;

use async_trait::async_trait;

use super::{Connection, FrameWriter, SessionId, error::RepositoryError};

/// Concurrency-safe mapping from session id to live connection.
///
/// An id is present exactly while its read loop runs. Insert and remove are
/// the only mutations; entries are never modified in place.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Mint a fresh id, wrap `writer` in a [`Connection`] and insert it.
    ///
    /// Pure bookkeeping: never performs I/O.
    async fn register(
        &self,
        writer: Box<dyn FrameWriter>,
    ) -> Result<Arc<Connection>, RepositoryError>;

    /// Remove the entry if present. Removing a missing id is a no-op.
    async fn unregister(&self, session_id: &SessionId) -> Option<Arc<Connection>>;

    async fn lookup(&self, session_id: &SessionId) -> Option<Arc<Connection>>;

    /// Point-in-time copy of every entry, oldest connection first.
    async fn snapshot(&self) -> Vec<(SessionId, Arc<Connection>)>;

    async fn count(&self) -> usize;
}
