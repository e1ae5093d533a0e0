// handlers/mod.rs - HTTP surface
//
// auth:    /api/admin/*, /api/developer/*, /api/surveyor/*, /api/admins, /api/surveyors
// records: /api/records[/bulk|/:id]
// system:  /, /health

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::ApiError;

pub mod auth;
pub mod records;
pub mod system;

/// Unwrap a JSON body, reporting malformed input as `INVALID_JSON`.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))
}
