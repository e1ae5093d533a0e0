// handlers/system.rs - banner and liveness

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Demographics API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/admin/*, /api/developer/login, /api/surveyor/*",
            "accounts": "/api/admins, /api/surveyors",
            "records": "/api/records[/bulk|/:id]",
            "health": "/health",
        }
    }))
}

/// GET /health - 200 when the record store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if let Err(e) = state.records.ping().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::service_unavailable("Database unavailable"));
    }

    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
