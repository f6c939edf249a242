//! UseCase: ユニキャスト送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 指定した SessionId への送信と、失敗時のエラー種別
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済みセッションへの送信
//! - 異常系：未登録・登録解除済みの ID（NotFound）
//! - 異常系：書き込み失敗（DeliveryFailed、登録は維持される）

use std::sync::Arc;

use crate::domain::{Frame, SessionId, SessionRepository};

use super::error::SendMessageError;

/// ユニキャスト送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// メッセージ送信を実行
    ///
    /// 書き込み失敗は呼び出し元に返すだけで、登録解除は行わない。
    /// 登録はそのセッションの read loop が終了するまで残る。
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 送信成功
    /// * `Err(SendMessageError::NotFound)` - セッションが存在しない
    /// * `Err(SendMessageError::DeliveryFailed)` - 書き込み失敗
    pub async fn execute(
        &self,
        session_id: &SessionId,
        frame: Frame,
    ) -> Result<(), SendMessageError> {
        let connection = self
            .repository
            .lookup(session_id)
            .await
            .ok_or(SendMessageError::NotFound(*session_id))?;

        connection.send(frame).await.map_err(|e| {
            tracing::warn!("Failed to send message to session '{}': {}", session_id, e);
            SendMessageError::DeliveryFailed {
                session_id: *session_id,
                reason: e.to_string(),
            }
        })
    }
}
