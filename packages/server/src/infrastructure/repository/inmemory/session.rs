//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。

use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    Connection, DEFAULT_WRITE_TIMEOUT, FrameWriter, RepositoryError, SessionId, SessionIdFactory,
    SessionRepository, Timestamp,
};

/// `register` が ID の再生成を諦めるまでの試行回数
pub const MAX_ID_ATTEMPTS: usize = 8;

type IdGenerator = Box<dyn Fn() -> SessionId + Send + Sync>;

/// インメモリ Session Repository 実装
///
/// HashMap を 1 つの `RwLock` で保護する。ロックはマップ操作の間だけ保持し、
/// 呼び出し元が転送路に触れる前に必ず解放される。
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, Arc<Connection>>>,
    id_generator: IdGenerator,
    write_timeout: Duration,
}

impl InMemorySessionRepository {
    /// 新しい InMemorySessionRepository を作成（UUID v4 で ID を生成）
    pub fn new() -> Self {
        Self::with_id_generator(SessionIdFactory::generate)
    }

    /// UUID の代わりに任意の ID 生成器を使う（テストで衝突を再現する用途）
    pub fn with_id_generator<F>(generator: F) -> Self
    where
        F: Fn() -> SessionId + Send + Sync + 'static,
    {
        Self {
            sessions: RwLock::new(HashMap::new()),
            id_generator: Box::new(generator),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// 登録する接続の書き込みタイムアウトを設定
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemorySessionRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySessionRepository")
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn register(
        &self,
        writer: Box<dyn FrameWriter>,
    ) -> Result<Arc<Connection>, RepositoryError> {
        let mut sessions = self.sessions.write().await;

        // 既存の接続を上書きしないよう、衝突した場合は再生成する
        let session_id = (0..MAX_ID_ATTEMPTS)
            .map(|_| (self.id_generator)())
            .find(|candidate| !sessions.contains_key(candidate))
            .ok_or(RepositoryError::IdExhausted {
                attempts: MAX_ID_ATTEMPTS,
            })?;

        let connection = Arc::new(
            Connection::new(session_id, Timestamp::now(), writer)
                .with_write_timeout(self.write_timeout),
        );
        sessions.insert(session_id, connection.clone());

        Ok(connection)
    }

    async fn unregister(&self, session_id: &SessionId) -> Option<Arc<Connection>> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id)
    }

    async fn lookup(&self, session_id: &SessionId) -> Option<Arc<Connection>> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    async fn snapshot(&self) -> Vec<(SessionId, Arc<Connection>)> {
        let mut entries: Vec<_> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .map(|(id, connection)| (*id, connection.clone()))
                .collect()
        };
        entries.sort_by_key(|(id, connection)| (connection.connected_at(), *id));
        entries
    }

    async fn count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}
