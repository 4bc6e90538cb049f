//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::handlers::health;
use crate::handlers::jobs::{get_job_status, submit_job};
use crate::handlers::ledger::list_ledger;
use crate::handlers::sync::transcribe_sync;
use crate::middleware::{request_logging, require_api_key};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    // Submission routes sit behind the shared-secret header check.
    let protected = Router::new()
        .route("/jobs", post(submit_job))
        .route("/transcribe-sync", post(transcribe_sync))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    // Polling and reads stay open.
    let open = Router::new()
        .route("/jobs/:job_id/status", get(get_job_status))
        .route("/ledger", get(list_ledger));

    let api_routes = Router::new()
        .merge(protected)
        .merge(open)
        .nest_service("/artifacts", ServeDir::new(state.artifacts.root()));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(
            CorsLayer::new()
                .allow_methods(Any)
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}
