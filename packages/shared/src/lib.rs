//! Shared utilities for the Sessionhub server and client.

pub mod logger;
pub mod time;
