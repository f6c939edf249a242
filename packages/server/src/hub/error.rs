//! Errors surfaced by the hub façade.

use thiserror::Error;

use crate::{
    domain::{SessionId, ValueObjectError},
    usecase::{CloseSessionError, ConnectError, SendMessageError},
};

/// Every hub error is local and recoverable; none of them affects other
/// sessions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// The protocol upgrade failed; nothing was registered
    #[error("upgrade failed: {0}")]
    UpgradeFailed(String),

    /// A session id supplied from outside did not parse
    #[error("invalid session id: {0}")]
    InvalidSessionId(#[from] ValueObjectError),

    /// The session is no longer live (or never was)
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The session looked live but the write failed
    #[error("delivery to session {session_id} failed: {reason}")]
    DeliveryFailed {
        session_id: SessionId,
        reason: String,
    },

    /// The hub refused a new connection (shutting down, or no id available)
    #[error("connection rejected: {0}")]
    Rejected(String),
}

impl From<SendMessageError> for HubError {
    fn from(e: SendMessageError) -> Self {
        match e {
            SendMessageError::NotFound(session_id) => HubError::NotFound(session_id),
            SendMessageError::DeliveryFailed { session_id, reason } => {
                HubError::DeliveryFailed { session_id, reason }
            }
        }
    }
}

impl From<CloseSessionError> for HubError {
    fn from(e: CloseSessionError) -> Self {
        match e {
            CloseSessionError::NotFound(session_id) => HubError::NotFound(session_id),
        }
    }
}

impl From<ConnectError> for HubError {
    fn from(e: ConnectError) -> Self {
        HubError::Rejected(e.to_string())
    }
}
