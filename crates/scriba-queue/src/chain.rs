//! Pipeline chain coordination.
//!
//! A chain is an ordered list of stage plans carried in the task envelope.
//! The submission side builds the first envelope; after a stage succeeds
//! and its result is durably recorded, the worker asks for the next
//! envelope, which receives the full upstream result as its sole input.

use chrono::Utc;

use scriba_models::{JobId, StageResult, TaskId};

use crate::error::{QueueError, QueueResult};
use crate::task::{StagePayload, StagePlan, TaskEnvelope, TranscribeParams};

/// Build the initial envelope of a pipeline. The returned envelope's job
/// id is the identifier callers poll with.
pub fn first_envelope(params: TranscribeParams, downstream: Vec<StagePlan>) -> TaskEnvelope {
    let task_id = TaskId::new();
    TaskEnvelope {
        job_id: JobId::from(task_id.clone()),
        task_id,
        stage: StagePayload::Transcribe(params),
        downstream,
        created_at: Utc::now(),
    }
}

/// Materialize the next stage of a chain from the completed stage's
/// result. Returns `Ok(None)` when the chain is exhausted.
pub fn next_envelope(
    completed: &TaskEnvelope,
    result: &StageResult,
) -> QueueResult<Option<TaskEnvelope>> {
    let Some((next, rest)) = completed.downstream.split_first() else {
        return Ok(None);
    };

    let stage = match (next, result) {
        (StagePlan::RenderVideo, StageResult::Transcript(t)) => StagePayload::RenderVideo {
            audio_path: t.input_path.clone(),
            subtitle_path: t.output_path.clone(),
        },
        (StagePlan::RenderVideo, other) => {
            return Err(QueueError::chain_input(format!(
                "render stage needs a transcript upstream, got {other:?}"
            )))
        }
    };

    Ok(Some(TaskEnvelope {
        task_id: TaskId::new(),
        job_id: completed.job_id.clone(),
        stage,
        downstream: rest.to_vec(),
        created_at: Utc::now(),
    }))
}
