//! Task envelopes carried on the broker stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use scriba_models::{JobId, OutputFormat, TaskId};

/// Parameters of a transcription stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscribeParams {
    /// Persisted media artifact
    pub input_path: PathBuf,
    /// Transcript the engine must produce
    pub output_path: PathBuf,
    /// Language hint, empty = auto-detect
    pub language: String,
    /// Transcript format
    pub format: OutputFormat,
    /// Engine model name
    pub model: String,
}

/// Concrete payload of one dispatched stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StagePayload {
    Transcribe(TranscribeParams),
    /// Materialized from the upstream transcript result by the chain
    /// coordinator.
    RenderVideo {
        audio_path: PathBuf,
        subtitle_path: PathBuf,
    },
}

/// A downstream stage not yet materialized; its parameters come from the
/// upstream stage's result at handoff time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePlan {
    RenderVideo,
}

/// One unit of queued work: a stage plus the remaining chain plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    /// Broker-assigned id of this stage
    pub task_id: TaskId,
    /// Externally visible job handle; equals the first task's id
    pub job_id: JobId,
    /// The stage to execute
    pub stage: StagePayload,
    /// Stages to run after this one succeeds
    pub downstream: Vec<StagePlan>,
    /// When the envelope was created
    pub created_at: DateTime<Utc>,
}

impl TaskEnvelope {
    /// Whether this stage is the last of its pipeline.
    pub fn is_final(&self) -> bool {
        self.downstream.is_empty()
    }

    /// Artifact paths this stage and its planned successors will touch,
    /// for the sweeper's in-flight exclusion.
    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        match &self.stage {
            StagePayload::Transcribe(p) => {
                vec![p.input_path.clone(), p.output_path.clone()]
            }
            StagePayload::RenderVideo {
                audio_path,
                subtitle_path,
            } => vec![audio_path.clone(), subtitle_path.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serde_roundtrip() {
        let envelope = TaskEnvelope {
            task_id: TaskId::new(),
            job_id: JobId::new(),
            stage: StagePayload::Transcribe(TranscribeParams {
                input_path: PathBuf::from("/uploads/uid_talk"),
                output_path: PathBuf::from("/uploads/uid_talk.srt"),
                language: String::new(),
                format: OutputFormat::Srt,
                model: "base".to_string(),
            }),
            downstream: vec![StagePlan::RenderVideo],
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&envelope).expect("serialize envelope");
        let decoded: TaskEnvelope = serde_json::from_str(&json).expect("deserialize envelope");

        assert_eq!(decoded.task_id, envelope.task_id);
        assert_eq!(decoded.job_id, envelope.job_id);
        assert_eq!(decoded.stage, envelope.stage);
        assert_eq!(decoded.downstream, envelope.downstream);
        assert!(!decoded.is_final());
    }

    #[test]
    fn artifact_paths_cover_stage_inputs_and_outputs() {
        let envelope = TaskEnvelope {
            task_id: TaskId::new(),
            job_id: JobId::new(),
            stage: StagePayload::RenderVideo {
                audio_path: PathBuf::from("/uploads/uid_talk"),
                subtitle_path: PathBuf::from("/uploads/uid_talk.srt"),
            },
            downstream: Vec::new(),
            created_at: Utc::now(),
        };

        let paths = envelope.artifact_paths();
        assert!(paths.contains(&PathBuf::from("/uploads/uid_talk")));
        assert!(paths.contains(&PathBuf::from("/uploads/uid_talk.srt")));
    }
}
