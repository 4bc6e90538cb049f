//! Stage processing and chain handoff.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use scriba_media::{rendered_video_path, ExternalTool, MediaResult, TranscribeRequest};
use scriba_models::{StageResult, TaskOutcome};
use scriba_queue::{next_envelope, ResultStore, StagePayload, TaskEnvelope, TaskQueue};

use crate::error::WorkerResult;

/// Everything a stage run needs.
pub struct StageContext {
    pub tools: Arc<dyn ExternalTool>,
    pub queue: Arc<TaskQueue>,
    pub results: Arc<ResultStore>,
}

/// Run one envelope to a terminal record.
///
/// Engine failures are captured as the task's failure outcome and never
/// propagate; only broker/result-store errors bubble up, leaving the
/// message unacked for redelivery.
pub async fn run_task(ctx: &StageContext, envelope: &TaskEnvelope) -> WorkerResult<()> {
    match execute_stage(ctx.tools.as_ref(), &envelope.stage).await {
        Ok(result) => complete_stage(ctx, envelope, result).await,
        Err(e) => {
            error!(
                task_id = %envelope.task_id,
                job_id = %envelope.job_id,
                "Stage failed: {}", e
            );
            fail_job(ctx, envelope, e.to_string()).await
        }
    }
}

async fn execute_stage(
    tools: &dyn ExternalTool,
    stage: &StagePayload,
) -> MediaResult<StageResult> {
    match stage {
        StagePayload::Transcribe(p) => {
            let req = TranscribeRequest {
                input_path: p.input_path.clone(),
                output_path: p.output_path.clone(),
                language: p.language.clone(),
                format: p.format,
                model: p.model.clone(),
            };
            tools.transcribe(&req).await.map(StageResult::Transcript)
        }
        StagePayload::RenderVideo {
            audio_path,
            subtitle_path,
        } => tools
            .render_subtitled_video(audio_path, subtitle_path)
            .await
            .map(StageResult::Video),
    }
}

/// Record a successful stage; either hand off to the next chain stage or
/// publish the job-visible terminal outcome.
async fn complete_stage(
    ctx: &StageContext,
    envelope: &TaskEnvelope,
    result: StageResult,
) -> WorkerResult<()> {
    let outcome = TaskOutcome::completed(result.clone());

    // The stage result must be durable before any downstream dispatch.
    ctx.results
        .record_task(&envelope.task_id, &outcome)
        .await?;

    match next_envelope(envelope, &result) {
        Ok(Some(next)) => {
            ctx.results.register_paths(&stage_paths(&next)).await?;
            ctx.queue.enqueue(&next).await?;
            info!(
                job_id = %envelope.job_id,
                next_task = %next.task_id,
                "Chained next stage"
            );
            Ok(())
        }
        Ok(None) => {
            ctx.results.record_job(&envelope.job_id, &outcome).await?;
            ctx.results
                .release_paths(&stage_paths(envelope))
                .await?;
            info!(job_id = %envelope.job_id, "Job completed");
            Ok(())
        }
        Err(e) => fail_job(ctx, envelope, e.to_string()).await,
    }
}

/// Record a failure as the job's terminal outcome; downstream stages are
/// skipped.
async fn fail_job(ctx: &StageContext, envelope: &TaskEnvelope, error: String) -> WorkerResult<()> {
    let outcome = TaskOutcome::failed(error);
    ctx.results
        .record_task(&envelope.task_id, &outcome)
        .await?;
    ctx.results.record_job(&envelope.job_id, &outcome).await?;
    ctx.results
        .release_paths(&stage_paths(envelope))
        .await?;
    Ok(())
}

/// Artifact paths a stage touches, including the derived render target.
fn stage_paths(envelope: &TaskEnvelope) -> Vec<PathBuf> {
    let mut paths = envelope.artifact_paths();
    if let StagePayload::RenderVideo { audio_path, .. } = &envelope.stage {
        paths.push(rendered_video_path(audio_path));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scriba_media::MediaError;
    use scriba_models::{OutputFormat, TranscriptResult, VideoResult};
    use scriba_queue::TranscribeParams;
    use std::path::Path;

    /// Scripted tool double: succeeds or fails per stage.
    struct ScriptedTool {
        transcribe_ok: bool,
        render_ok: bool,
    }

    #[async_trait]
    impl ExternalTool for ScriptedTool {
        async fn transcribe(&self, req: &TranscribeRequest) -> MediaResult<TranscriptResult> {
            if self.transcribe_ok {
                Ok(TranscriptResult {
                    input_path: req.input_path.clone(),
                    output_path: req.output_path.clone(),
                })
            } else {
                Err(MediaError::engine_failed(
                    "whisper-cli",
                    "model file not found",
                    Some(1),
                ))
            }
        }

        async fn render_subtitled_video(
            &self,
            audio_path: &Path,
            _subtitle_path: &Path,
        ) -> MediaResult<VideoResult> {
            if self.render_ok {
                Ok(VideoResult {
                    output_path: rendered_video_path(audio_path),
                })
            } else {
                Err(MediaError::engine_failed("ffmpeg", "invalid data", Some(1)))
            }
        }

        async fn probe_duration(&self, _path: &Path) -> MediaResult<f64> {
            Ok(30.0)
        }
    }

    fn transcribe_stage() -> StagePayload {
        StagePayload::Transcribe(TranscribeParams {
            input_path: PathBuf::from("/uploads/uid_talk"),
            output_path: PathBuf::from("/uploads/uid_talk.srt"),
            language: "de".to_string(),
            format: OutputFormat::Srt,
            model: "base".to_string(),
        })
    }

    #[tokio::test]
    async fn transcribe_stage_yields_transcript_result() {
        let tool = ScriptedTool {
            transcribe_ok: true,
            render_ok: true,
        };

        let result = execute_stage(&tool, &transcribe_stage())
            .await
            .expect("stage runs");

        match result {
            StageResult::Transcript(t) => {
                assert_eq!(t.input_path, PathBuf::from("/uploads/uid_talk"));
                assert_eq!(t.output_path, PathBuf::from("/uploads/uid_talk.srt"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn engine_failure_carries_stderr_text() {
        let tool = ScriptedTool {
            transcribe_ok: false,
            render_ok: true,
        };

        let err = execute_stage(&tool, &transcribe_stage())
            .await
            .expect_err("stage fails");
        assert!(err.to_string().contains("model file not found"));
    }

    #[tokio::test]
    async fn render_stage_derives_output_from_audio() {
        let tool = ScriptedTool {
            transcribe_ok: true,
            render_ok: true,
        };

        let stage = StagePayload::RenderVideo {
            audio_path: PathBuf::from("/uploads/uid_talk"),
            subtitle_path: PathBuf::from("/uploads/uid_talk.srt"),
        };

        let result = execute_stage(&tool, &stage).await.expect("stage runs");
        match result {
            StageResult::Video(v) => {
                assert_eq!(v.output_path, PathBuf::from("/uploads/uid_talk.mp4"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn render_stage_paths_include_derived_target() {
        let envelope = TaskEnvelope {
            task_id: scriba_models::TaskId::new(),
            job_id: scriba_models::JobId::new(),
            stage: StagePayload::RenderVideo {
                audio_path: PathBuf::from("/uploads/uid_talk"),
                subtitle_path: PathBuf::from("/uploads/uid_talk.srt"),
            },
            downstream: Vec::new(),
            created_at: chrono::Utc::now(),
        };

        let paths = stage_paths(&envelope);
        assert!(paths.contains(&PathBuf::from("/uploads/uid_talk.mp4")));
    }
}
