//! Job submission and status polling.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use scriba_models::{JobId, MetadataRecord, OutputFormat, PipelineKind, SourceDescriptor};
use scriba_queue::{first_envelope, JobStatus, StagePlan, TranscribeParams};
use scriba_storage::ArtifactStore;

use crate::error::{ApiError, ApiResult};
use crate::fetch;
use crate::state::AppState;

/// Submission response: the identifier callers poll with.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
}

#[derive(Default)]
struct SubmitForm {
    upload: Option<(String, Vec<u8>)>,
    url: Option<String>,
    language: String,
    format: String,
    model: Option<String>,
    want_video: bool,
}

async fn read_form(multipart: &mut Multipart) -> ApiResult<SubmitForm> {
    let mut form = SubmitForm {
        format: "srt".to_string(),
        ..Default::default()
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "artifact".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid upload: {e}")))?;
                form.upload = Some((filename, bytes.to_vec()));
            }
            Some("url") => form.url = Some(read_text(field).await?),
            Some("language") => form.language = read_text(field).await?,
            Some("format") => form.format = read_text(field).await?,
            Some("model") => {
                let value = read_text(field).await?;
                if !value.is_empty() {
                    form.model = Some(value);
                }
            }
            Some("want_video") => {
                let value = read_text(field).await?;
                form.want_video = matches!(value.as_str(), "true" | "1" | "on");
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart field: {e}")))
}

/// POST /api/jobs
///
/// Accepts an artifact (multipart `file` part or `url` field) plus
/// `language`, `format`, `model` and `want_video` fields. Persists the
/// artifact, enqueues the pipeline, appends a ledger record and returns
/// the job id.
pub async fn submit_job(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<SubmitResponse>> {
    let form = read_form(&mut multipart).await?;

    // Chained jobs burn subtitles into the render, so they always
    // transcribe to srt.
    let format = if form.want_video {
        OutputFormat::Srt
    } else {
        OutputFormat::parse(&form.format)
    };

    let file_id = Uuid::new_v4().to_string();

    let (source, input_path) = match (form.upload, form.url) {
        (Some((filename, bytes)), _) => {
            let input_path = state.artifacts.input_path(&file_id, &filename);
            state
                .artifacts
                .save_bytes(&input_path, &bytes)
                .await
                .map_err(|e| ApiError::internal(format!("Failed to persist artifact: {e}")))?;
            (SourceDescriptor::Upload { filename }, input_path)
        }
        (None, Some(url)) => {
            let input_path = state.artifacts.input_path(&file_id, "remote_audio");
            fetch::fetch_to_file(&state.http, &url, &input_path).await?;
            (SourceDescriptor::Url { url }, input_path)
        }
        (None, None) => {
            return Err(ApiError::bad_request(
                "Submission needs a file part or a url field",
            ))
        }
    };

    let output_path = ArtifactStore::transcript_path(&input_path, format);
    let model = form
        .model
        .unwrap_or_else(|| state.config.default_model.clone());

    let params = TranscribeParams {
        input_path: input_path.clone(),
        output_path: output_path.clone(),
        language: form.language.clone(),
        format,
        model: model.clone(),
    };
    let downstream = if form.want_video {
        vec![StagePlan::RenderVideo]
    } else {
        Vec::new()
    };

    let envelope = first_envelope(params, downstream);
    let job_id = envelope.job_id.clone();

    state.results.register_paths(&envelope.artifact_paths()).await?;
    state.queue.enqueue(&envelope).await?;

    let record = MetadataRecord {
        job_id: job_id.clone(),
        submitted_at: Utc::now(),
        source,
        input_path,
        output_path: Some(output_path),
        language: MetadataRecord::language_label(&form.language),
        format,
        model: Some(model),
        pipeline: if form.want_video {
            PipelineKind::TranscriptVideoChain
        } else {
            PipelineKind::Transcription
        },
        processing_secs: None,
    };
    state.ledger.append(record).await?;

    info!(job_id = %job_id, "Accepted job");
    Ok(Json(SubmitResponse { job_id }))
}

/// GET /api/jobs/:job_id/status
///
/// Read-only projection of the result store: pending until the pipeline's
/// last stage is terminal, then completed (with the result payload and the
/// inferred artifact kind) or failed (with the captured error text).
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatus>> {
    let status = state
        .results
        .job_status(&JobId::from_string(job_id))
        .await?;
    Ok(Json(status))
}
