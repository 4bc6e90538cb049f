//! HTTP handlers.

pub mod jobs;
pub mod ledger;
pub mod sync;

use axum::Json;
use serde_json::{json, Value};

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
