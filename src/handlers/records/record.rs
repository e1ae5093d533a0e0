use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::{Record, RecordPatchInput};
use crate::database::ObjectId;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::services::ServiceError;

/// GET /api/records/:id - fetch a single record
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    Ok(Json(state.records.get_record(&id).await?))
}

/// PUT /api/records/:id - change only the supplied fields
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RecordPatchInput>, JsonRejection>,
) -> Result<Json<Record>, ApiError> {
    // A bad id wins over a bad body.
    ObjectId::parse_str(&id).map_err(ServiceError::from)?;
    let patch = json_body(payload)?;
    Ok(Json(state.records.update_record(&id, patch).await?))
}

/// DELETE /api/records/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.records.delete_record(&id).await?;
    Ok(Json(json!({ "success": true })))
}
