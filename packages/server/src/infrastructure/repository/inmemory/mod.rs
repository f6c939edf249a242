//! InMemory 実装

pub mod session;

pub use session::{InMemorySessionRepository, MAX_ID_ATTEMPTS};
