//! UseCase: セッション接続処理
//!
//! 新しい接続に SessionId を割り当て、レジストリに登録する。

use std::sync::Arc;

use crate::domain::{Connection, FrameWriter, RepositoryError, SessionRepository};

use super::error::ConnectError;

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
}

impl ConnectSessionUseCase {
    /// 新しい ConnectSessionUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// セッション接続を実行
    ///
    /// # Arguments
    ///
    /// * `writer` - 接続の書き込み側
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Connection>)` - 登録された接続（新しい SessionId を持つ）
    /// * `Err(ConnectError)` - ID を割り当てられなかった
    pub async fn execute(
        &self,
        writer: Box<dyn FrameWriter>,
    ) -> Result<Arc<Connection>, ConnectError> {
        let connection = self
            .repository
            .register(writer)
            .await
            .map_err(|e| match e {
                RepositoryError::IdExhausted { attempts } => ConnectError::IdExhausted { attempts },
            })?;

        tracing::info!(
            "Session '{}' registered ({} live)",
            connection.id(),
            self.repository.count().await
        );

        Ok(connection)
    }
}
