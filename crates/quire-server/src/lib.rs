//! HTTP server for Quire.
//!
//! Exposes the engine's document, fork and pull request operations as JSON
//! routes under `/api/doc`, plus a health probe.

pub mod config;
pub mod error;
pub mod handler;
pub mod payload;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, HealthResponse};
pub use router::build_router;
pub use server::QuireServer;
