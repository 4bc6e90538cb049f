//! Metadata ledger records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{JobId, OutputFormat, PipelineKind};

/// Where a job's input artifact came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDescriptor {
    /// Uploaded through the submission endpoint.
    Upload { filename: String },
    /// Fetched from a remote URL.
    Url { url: String },
}

/// One ledger entry, mirroring a job at submission time.
///
/// The synchronous path also records how long the engine ran; queued jobs
/// leave `processing_secs` unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Job identifier the caller polls with
    pub job_id: JobId,
    /// When the submission was accepted
    pub submitted_at: DateTime<Utc>,
    /// Upload or URL source
    pub source: SourceDescriptor,
    /// Persisted input artifact path
    pub input_path: PathBuf,
    /// Expected transcript path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Requested language, "auto" when the caller left it empty
    pub language: String,
    /// Requested output format
    pub format: OutputFormat,
    /// Engine model variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Single-stage or chained pipeline
    pub pipeline: PipelineKind,
    /// Engine wall time, synchronous path only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_secs: Option<f64>,
}

impl MetadataRecord {
    /// Normalize a caller-supplied language hint: empty means auto-detect.
    pub fn language_label(language: &str) -> String {
        if language.is_empty() {
            "auto".to_string()
        } else {
            language.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_label_defaults_to_auto() {
        assert_eq!(MetadataRecord::language_label(""), "auto");
        assert_eq!(MetadataRecord::language_label("de"), "de");
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = MetadataRecord {
            job_id: JobId::from_string("job-1"),
            submitted_at: Utc::now(),
            source: SourceDescriptor::Upload {
                filename: "talk.mp3".to_string(),
            },
            input_path: PathBuf::from("/uploads/uid_talk"),
            output_path: Some(PathBuf::from("/uploads/uid_talk.srt")),
            language: "auto".to_string(),
            format: OutputFormat::Srt,
            model: Some("base".to_string()),
            pipeline: PipelineKind::Transcription,
            processing_secs: None,
        };

        let json = serde_json::to_string(&record).expect("serialize record");
        let decoded: MetadataRecord = serde_json::from_str(&json).expect("deserialize record");

        assert_eq!(decoded.job_id, record.job_id);
        assert_eq!(decoded.source, record.source);
        assert_eq!(decoded.input_path, record.input_path);
        assert_eq!(decoded.format, OutputFormat::Srt);
        assert!(decoded.processing_secs.is_none());
    }
}
