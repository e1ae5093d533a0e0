// handlers/auth/developer.rs - POST /api/developer/login

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::services::DeveloperLogin;

/// Only the configured developer credential is accepted here.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<DeveloperLogin>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload)?;
    state.auth.developer_login(request).await?;
    Ok(Json(json!({ "success": true })))
}
