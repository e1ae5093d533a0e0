use axum::extract::{rejection::JsonRejection, Query, State};
use axum::Json;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::app::AppState;
use crate::database::models::RecordInput;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::services::RecordPage;

/// GET /api/records - filtered, sorted, paginated listing
///
/// Query: search, sex, caste, ageMin, ageMax, sort, order, page, pageSize.
/// Malformed values fall back to defaults rather than failing the request.
pub async fn get(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<RecordPage>, ApiError> {
    Ok(Json(state.records.list_records(&params).await?))
}

/// POST /api/records - create one record, returns `{ "id": ... }`
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<RecordInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let input = json_body(payload)?;
    let id = state.records.create_record(input).await?;
    Ok(Json(json!({ "id": id })))
}

/// POST /api/records/bulk - create many records from a JSON array
pub async fn bulk(
    State(state): State<AppState>,
    payload: Result<Json<Vec<RecordInput>>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let inputs = json_body(payload)?;
    let inserted = state.records.create_records_bulk(inputs).await?;
    Ok(Json(json!({ "success": true, "insertedCount": inserted })))
}
