//! Pipeline worker.
//!
//! This crate provides:
//! - Task executor with bounded concurrency and crash-recovery claiming
//! - Stage processing through the `ExternalTool` adapter
//! - Chain handoff: downstream stages enqueue only after the upstream
//!   result is durably recorded
//! - Graceful shutdown

pub mod config;
pub mod error;
pub mod executor;
pub mod stages;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::TaskExecutor;
pub use stages::StageContext;
