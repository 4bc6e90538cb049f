//! Error types for engine invocations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine invocations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving the external engines.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Engine binary not found: {0}")]
    EngineNotFound(PathBuf),

    #[error("{engine} failed: {stderr}")]
    EngineFailed {
        engine: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("FFprobe failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("No duration in probe output")]
    MissingDuration,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create an engine failure error from a captured exit.
    pub fn engine_failed(
        engine: impl Into<String>,
        stderr: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::EngineFailed {
            engine: engine.into(),
            stderr: stderr.into(),
            exit_code,
        }
    }
}
