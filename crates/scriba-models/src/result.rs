//! Tagged per-stage results and terminal task outcomes.
//!
//! Each pipeline stage returns a typed result instead of an ad-hoc
//! dictionary; the chain coordinator passes the full upstream result to
//! the next stage.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ArtifactKind;

/// Result of a completed transcription stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptResult {
    /// The audio/video artifact that was transcribed
    pub input_path: PathBuf,
    /// The produced subtitle or plain-text transcript
    pub output_path: PathBuf,
}

/// Result of a completed video-render stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoResult {
    /// The rendered, subtitle-burned MP4
    pub output_path: PathBuf,
}

/// Successful result of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageResult {
    Transcript(TranscriptResult),
    Video(VideoResult),
}

impl StageResult {
    /// The artifact a caller would fetch for this stage.
    pub fn output_path(&self) -> &Path {
        match self {
            StageResult::Transcript(r) => &r.output_path,
            StageResult::Video(r) => &r.output_path,
        }
    }

    /// Best-effort classification of the stage's output artifact.
    pub fn artifact_kind(&self) -> ArtifactKind {
        ArtifactKind::from_path(self.output_path())
    }
}

/// Terminal record for a task attempt. Written exactly once per attempt;
/// on redelivery the newest terminal record wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Completed { result: StageResult },
    Failed { error: String },
}

impl TaskOutcome {
    pub fn completed(result: StageResult) -> Self {
        Self::Completed { result }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Completed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_outcome_serde_roundtrip() {
        let outcome = TaskOutcome::completed(StageResult::Transcript(TranscriptResult {
            input_path: PathBuf::from("/uploads/uid_talk"),
            output_path: PathBuf::from("/uploads/uid_talk.srt"),
        }));

        let json = serde_json::to_string(&outcome).expect("serialize outcome");
        assert!(json.contains("\"status\":\"completed\""));
        assert!(json.contains("\"stage\":\"transcript\""));

        let decoded: TaskOutcome = serde_json::from_str(&json).expect("deserialize outcome");
        assert_eq!(decoded, outcome);
    }

    #[test]
    fn failed_outcome_keeps_error_text() {
        let outcome = TaskOutcome::failed("engine exited with status 1");
        let json = serde_json::to_string(&outcome).expect("serialize outcome");
        let decoded: TaskOutcome = serde_json::from_str(&json).expect("deserialize outcome");
        match decoded {
            TaskOutcome::Failed { error } => assert_eq!(error, "engine exited with status 1"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn stage_result_classifies_output() {
        let transcript = StageResult::Transcript(TranscriptResult {
            input_path: PathBuf::from("a"),
            output_path: PathBuf::from("a.srt"),
        });
        assert_eq!(transcript.artifact_kind(), ArtifactKind::Text);

        let video = StageResult::Video(VideoResult {
            output_path: PathBuf::from("a.mp4"),
        });
        assert_eq!(video.artifact_kind(), ArtifactKind::Video);
    }
}
