//! Job and task identifiers plus submission-time enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Externally visible identifier for a submitted job.
///
/// Equals the first task's id for a single-stage job; for a chained job it
/// is the chain handle returned by the initial enqueue call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broker-assigned identifier for one stage of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a new random task ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TaskId> for JobId {
    fn from(id: TaskId) -> Self {
        JobId(id.0)
    }
}

/// Requested transcript output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Subtitle file with timing (.srt)
    #[default]
    Srt,
    /// Plain text transcript (.txt)
    Txt,
}

impl OutputFormat {
    /// Parse a client-supplied format string. Unrecognized values fall back
    /// to plain text.
    pub fn parse(s: &str) -> Self {
        match s {
            "srt" => OutputFormat::Srt,
            _ => OutputFormat::Txt,
        }
    }

    /// File extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Srt => ".srt",
            OutputFormat::Txt => ".txt",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Srt => "srt",
            OutputFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a job's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    /// Single transcription stage
    #[default]
    Transcription,
    /// Transcription chained into a subtitled-video render
    TranscriptVideoChain,
}
