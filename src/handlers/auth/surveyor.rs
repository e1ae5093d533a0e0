// handlers/auth/surveyor.rs - surveyor registration, login and listing

use axum::extract::{rejection::JsonRejection, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::SurveyorAccount;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::services::SurveyorCredentials;

/// POST /api/surveyor/register - `{ "id": string, "password": string }`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<SurveyorCredentials>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = json_body(payload)?;
    state.auth.surveyor_register(request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Surveyor registered" }))))
}

/// POST /api/surveyor/login - `{ "id": string, "password": string }`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<SurveyorCredentials>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload)?;
    state.auth.surveyor_login(request).await?;
    Ok(Json(json!({ "message": "Login successful" })))
}

/// GET /api/surveyors
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<SurveyorAccount>>, ApiError> {
    Ok(Json(state.auth.list_surveyors().await?))
}
