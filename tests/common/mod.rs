#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use demographics_api::config::{AppConfig, StaticCredential};
use demographics_api::{build_router, AppState};

pub const DEVELOPER_EMAIL: &str = "dev@example.com";
pub const DEVELOPER_PASSWORD: &str = "devpass";

/// Development config with a cheap bcrypt cost and a developer credential.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.bcrypt_cost = 4;
    config.security.developer = Some(StaticCredential::new(DEVELOPER_EMAIL, DEVELOPER_PASSWORD));
    config
}

/// A fresh router over empty in-memory stores.
pub fn test_app() -> Router {
    build_router(AppState::in_memory(Arc::new(test_config())))
}

/// Send one request through the router and decode the JSON reply.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json)?)
        }
        None => Body::empty(),
    };
    send_request(app, builder.body(body)?).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}

pub async fn get(app: &Router, uri: &str) -> Result<(StatusCode, Value)> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    send(app, Method::POST, uri, Some(body)).await
}

/// Create a record and return its id.
pub async fn create_record(app: &Router, fields: Value) -> Result<String> {
    let (status, body) = post(app, "/api/records", fields).await?;
    anyhow::ensure!(status == StatusCode::OK, "create failed: {} {}", status, body);
    body["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("missing id in {}", body))
}
