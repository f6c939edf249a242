//! Domain layer error definitions.

use std::time::Duration;

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// SessionId validation error
    #[error("SessionId cannot be empty")]
    SessionIdEmpty,

    /// SessionId invalid format error (not a valid UUID format)
    #[error("SessionId must be a valid UUID format (got: {0})")]
    SessionIdInvalidFormat(String),
}

/// Errors raised by a connection's transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The peer closed the connection, or it was closed locally
    #[error("connection closed")]
    Closed,

    /// Low-level I/O failure
    #[error("transport I/O error: {0}")]
    Io(String),

    /// The peer violated the framing protocol
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The transport did not accept the write (or close) in time
    #[error("transport stalled for {0:?}")]
    TimedOut(Duration),
}

/// Errors related to the session registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Every generated identifier collided with a live session
    #[error("could not mint a unique session id after {attempts} attempts")]
    IdExhausted { attempts: usize },
}
