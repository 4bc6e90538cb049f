//! Redis Streams task broker for the Scriba pipeline.
//!
//! This crate provides:
//! - Task enqueueing and at-least-once consumption via Redis Streams
//! - The terminal result store the Status Tracker reads
//! - The active-path registry consulted by the retention sweeper
//! - Chain coordination: envelope construction and stage-to-stage handoff

pub mod chain;
pub mod error;
pub mod queue;
pub mod results;
pub mod task;

pub use chain::{first_envelope, next_envelope};
pub use error::{QueueError, QueueResult};
pub use queue::{QueueConfig, TaskQueue};
pub use results::{JobStatus, ResultStore, ResultStoreConfig};
pub use task::{StagePayload, StagePlan, TaskEnvelope, TranscribeParams};
