//! API middleware.

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, Response};
use axum::middleware::Next;
use axum::response::IntoResponse;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Reject requests whose `X-Api-Key` header does not match the configured
/// shared secret. Applied to submission routes only; rejection happens
/// before any side effect.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    if provided != Some(state.config.api_key.as_str()) {
        warn!(uri = %request.uri(), "Rejected request with invalid API key");
        return ApiError::unauthorized("Invalid API key").into_response();
    }

    next.run(request).await
}

/// Request logging middleware.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let duration = start.elapsed();

    if uri.path() != "/health" {
        info!(
            method = %method,
            uri = %uri,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}
