//! UseCase: セッション強制切断（管理用）
//!
//! read loop に終了を要求するだけで、登録解除は read loop 側で行われる。

use std::sync::Arc;

use crate::domain::{SessionId, SessionRepository};

use super::error::CloseSessionError;

/// セッション強制切断のユースケース
pub struct CloseSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl CloseSessionUseCase {
    /// 新しい CloseSessionUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// 強制切断を要求
    pub async fn execute(&self, session_id: &SessionId) -> Result<(), CloseSessionError> {
        let connection = self
            .repository
            .lookup(session_id)
            .await
            .ok_or(CloseSessionError::NotFound(*session_id))?;

        tracing::info!("Close requested for session '{}'", session_id);
        connection.request_close();
        Ok(())
    }

    /// 全セッションに終了を要求し、要求したセッション数を返す
    pub async fn execute_all(&self) -> usize {
        let targets = self.repository.snapshot().await;
        for (_, connection) in &targets {
            connection.request_close();
        }
        targets.len()
    }
}
