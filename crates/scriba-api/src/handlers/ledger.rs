//! Ledger listing.

use axum::extract::State;
use axum::Json;

use scriba_models::MetadataRecord;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/ledger
///
/// The full ordered list of metadata records.
pub async fn list_ledger(State(state): State<AppState>) -> ApiResult<Json<Vec<MetadataRecord>>> {
    let records = state.ledger.list().await?;
    Ok(Json(records))
}
