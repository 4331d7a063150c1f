//! HTTP transport for the a2t protocol.
//!
//! Maps capability-derived routes onto a [`a2t_core::ToolProvider`] and
//! passes provider responses through unchanged.

pub mod api;
pub mod config;
pub mod demo;

pub use api::{create_router, serve, CAPABILITIES_PATH};
pub use config::{AppState, ServerConfig};
