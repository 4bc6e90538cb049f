//! Durable-state layer for the Scriba pipeline.
//!
//! This crate provides:
//! - The append-only metadata ledger (single JSON-array file)
//! - Upload-root artifact persistence and path derivation
//! - Age-based retention sweeping

pub mod artifacts;
pub mod error;
pub mod ledger;
pub mod retention;

pub use artifacts::ArtifactStore;
pub use error::{StorageError, StorageResult};
pub use ledger::Ledger;
pub use retention::RetentionSweeper;
