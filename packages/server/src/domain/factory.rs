//! Domain factories for creating domain entities and value objects.

use super::SessionId;

/// Factory for generating SessionId instances.
///
/// Keeps identifier generation apart from parsing and validation in
/// `SessionId`, and gives the registry a single default generator.
pub struct SessionIdFactory;

impl SessionIdFactory {
    /// Generate a new SessionId from a random UUID v4 (122 random bits).
    pub fn generate() -> SessionId {
        SessionId::from_uuid(uuid::Uuid::new_v4())
    }
}
