//! Shared data models for the Scriba pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Job and task identifiers
//! - Output formats and artifact-kind classification
//! - Metadata ledger records
//! - Tagged per-stage results and terminal task outcomes

pub mod artifact;
pub mod job;
pub mod record;
pub mod result;

// Re-export common types
pub use artifact::ArtifactKind;
pub use job::{JobId, OutputFormat, PipelineKind, TaskId};
pub use record::{MetadataRecord, SourceDescriptor};
pub use result::{StageResult, TaskOutcome, TranscriptResult, VideoResult};
