//! Axum HTTP API server.
//!
//! This crate provides:
//! - Job submission (multipart upload or remote URL)
//! - Status polling against the result store
//! - Ledger listing and artifact serving
//! - A synchronous transcription path
//! - API-key middleware and the periodic retention sweep

pub mod config;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod sweep;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use sweep::RetentionTask;
