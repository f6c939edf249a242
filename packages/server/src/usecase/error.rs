//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::SessionId;

/// 接続登録時のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("session id space exhausted after {attempts} attempts")]
    IdExhausted { attempts: usize },
}

/// ユニキャスト送信のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// 送信先が登録されていない（解除済み、または一度も登録されていない）
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// 送信先は登録されていたが、書き込みに失敗した
    #[error("delivery to session {session_id} failed: {reason}")]
    DeliveryFailed {
        session_id: SessionId,
        reason: String,
    },
}

/// 強制切断（管理用）のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CloseSessionError {
    #[error("session {0} not found")]
    NotFound(SessionId),
}

/// 受信ハンドラが返すエラー
///
/// セッション ID と共にログに出力されるだけで、read loop は終了しない。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}
