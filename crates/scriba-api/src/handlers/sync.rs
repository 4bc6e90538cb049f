//! Synchronous URL transcription.
//!
//! Unlike the queued path, this handler runs the engine inline, records
//! the processing duration in the ledger, sweeps expired artifacts and
//! returns the transcript body directly.

use std::time::Instant;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use scriba_media::TranscribeRequest;
use scriba_models::{JobId, MetadataRecord, OutputFormat, PipelineKind, SourceDescriptor};
use scriba_storage::{ArtifactStore, RetentionSweeper};

use crate::error::{ApiError, ApiResult};
use crate::fetch;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncQuery {
    /// Audio file URL
    pub url: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// POST /api/transcribe-sync
pub async fn transcribe_sync(
    State(state): State<AppState>,
    Query(query): Query<SyncQuery>,
) -> ApiResult<impl IntoResponse> {
    let format = OutputFormat::parse(query.format.as_deref().unwrap_or("srt"));
    let model = query
        .model
        .unwrap_or_else(|| state.config.default_model.clone());

    let file_id = Uuid::new_v4().to_string();
    let input_path = state.artifacts.input_path(&file_id, "remote_audio");
    let output_path = ArtifactStore::transcript_path(&input_path, format);

    fetch::fetch_to_file(&state.http, &query.url, &input_path).await?;

    let started = Instant::now();
    state
        .tools
        .transcribe(&TranscribeRequest {
            input_path: input_path.clone(),
            output_path: output_path.clone(),
            language: query.language.clone(),
            format,
            model: model.clone(),
        })
        .await?;
    let processing_secs = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;

    let record = MetadataRecord {
        job_id: JobId::from_string(file_id),
        submitted_at: Utc::now(),
        source: SourceDescriptor::Url { url: query.url },
        input_path,
        output_path: Some(output_path.clone()),
        language: MetadataRecord::language_label(&query.language),
        format,
        model: Some(model),
        pipeline: PipelineKind::Transcription,
        processing_secs: Some(processing_secs),
    };
    state.ledger.append(record).await?;

    let body = tokio::fs::read(&output_path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to read transcript: {e}")))?;

    info!(
        output = %output_path.display(),
        processing_secs,
        "Synchronous transcription done"
    );

    // Sweep after completion, off the response path.
    spawn_sweep(&state);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"transcript{}\"", format.extension()),
            ),
        ],
        body,
    ))
}

fn spawn_sweep(state: &AppState) {
    let sweeper = RetentionSweeper::new(state.artifacts.root(), state.config.max_artifact_age)
        .protect(&state.config.ledger_path);
    let results = state.results.clone();

    tokio::spawn(async move {
        match results.active_paths().await {
            Ok(in_flight) => {
                if let Err(e) = sweeper.sweep(&in_flight).await {
                    warn!("Retention sweep failed: {}", e);
                }
            }
            Err(e) => warn!("Skipping sweep, active paths unavailable: {}", e),
        }
    });
}
