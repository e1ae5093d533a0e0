use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::AppConfig;
use crate::database::{IdentityStore, MemoryIdentityStore, MemoryRecordStore, RecordStore};
use crate::handlers;
use crate::services::{AuthService, RecordService};

/// Shared handler state. Built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub records: Arc<RecordService>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        records: Arc<dyn RecordStore>,
        identities: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            records: Arc::new(RecordService::new(records)),
            auth: Arc::new(AuthService::new(identities, config.clone())),
            config,
        }
    }

    /// State over fresh in-memory stores; nothing survives a restart.
    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self::new(
            config,
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryIdentityStore::new()),
        )
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(auth_routes())
        .merge(record_routes())
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/admin/signup", post(auth::admin_signup))
        .route("/api/admin/login", post(auth::admin_login))
        .route("/api/admins", get(auth::admins_list))
        .route("/api/developer/login", post(auth::developer_login))
        .route("/api/surveyor/register", post(auth::surveyor_register))
        .route("/api/surveyor/login", post(auth::surveyor_login))
        .route("/api/surveyors", get(auth::surveyors_list))
}

fn record_routes() -> Router<AppState> {
    use handlers::records;

    Router::new()
        .route("/api/records", get(records::records_get).post(records::records_post))
        .route("/api/records/bulk", post(records::records_bulk))
        .route(
            "/api/records/:id",
            get(records::record_get)
                .put(records::record_put)
                .delete(records::record_delete),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
