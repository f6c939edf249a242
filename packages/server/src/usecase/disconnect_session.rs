//! UseCase: セッション切断処理
//!
//! read loop 終了後に一度だけ実行される後始末。
//! レジストリから削除してから、転送路を解放する。

use std::sync::Arc;

use crate::domain::{Connection, SessionRepository};

use super::dispatch::ReadTermination;

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl DisconnectSessionUseCase {
    /// 新しい DisconnectSessionUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// セッション切断を実行
    ///
    /// 先にレジストリから削除し（以降の送信からは見えなくなる）、その後で転送路を解放する。
    ///
    /// # Arguments
    ///
    /// * `connection` - 終了した接続
    /// * `reason` - read loop の終了理由（ログ出力用）
    pub async fn execute(&self, connection: &Connection, reason: &ReadTermination) {
        let session_id = connection.id();
        let removed = self.repository.unregister(&session_id).await.is_some();

        if let Err(e) = connection.release().await {
            tracing::debug!("Closing transport of '{}' failed: {}", session_id, e);
        }

        match reason {
            ReadTermination::Failed(e) => {
                tracing::warn!("Session '{}' terminated by transport error: {}", session_id, e)
            }
            _ => tracing::info!("Session '{}' disconnected ({})", session_id, reason),
        }
        if !removed {
            tracing::debug!("Session '{}' was already absent from the registry", session_id);
        }
    }
}
