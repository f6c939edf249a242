//! Infrastructure layer: registry storage, transports and DTOs.

pub mod dto;
pub mod repository;
pub mod transport;
