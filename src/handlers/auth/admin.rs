// handlers/auth/admin.rs - admin signup, login and listing

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::models::AdminAccount;
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::services::{AdminLogin, AdminSignup};

/// POST /api/admin/signup - register an admin account
///
/// Body: `{ "name"?: string, "email": string, "password": string }`
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<AdminSignup>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload)?;
    let admin = state.auth.admin_signup(request).await?;
    Ok(Json(json!({
        "message": "Admin registered successfully",
        "adminId": admin.id
    })))
}

/// POST /api/admin/login - check admin credentials
///
/// Body: `{ "email" | "id" | "username": string, "password": string }`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<AdminLogin>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = json_body(payload)?;
    state.auth.admin_login(request).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/admins - list admin accounts (no password material)
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<AdminAccount>>, ApiError> {
    Ok(Json(state.auth.list_admins().await?))
}
