//! HTTP / WebSocket front end of the hub.

mod error;
pub mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{ServerConfig, ServerError, create_router, run, serve};
pub use signal::shutdown_signal;
