//! Domain layer for the connection hub.
//!
//! This module contains the session, frame and transport models that are
//! independent of axum, DTOs and the concrete registry storage.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod transport;
pub mod value_object;

pub use entity::{Connection, DEFAULT_WRITE_TIMEOUT};
pub use error::{RepositoryError, TransportError, ValueObjectError};
pub use factory::SessionIdFactory;
pub use repository::SessionRepository;
pub use transport::{FrameReader, FrameWriter, Transport};
pub use value_object::{Frame, SessionId, Timestamp};
