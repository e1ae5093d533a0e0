mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use common::{get, post, send_request, test_app, DEVELOPER_EMAIL, DEVELOPER_PASSWORD};

#[tokio::test]
async fn admin_signup_then_login() -> Result<()> {
    let app = test_app();

    let (status, body) = post(
        &app,
        "/api/admin/signup",
        json!({ "name": "Meera", "email": "meera@example.com", "password": "hunter2" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["message"].is_string());
    assert_eq!(body["adminId"].as_str().map(str::len), Some(24));

    let (status, body) = post(
        &app,
        "/api/admin/login",
        json!({ "email": "meera@example.com", "password": "hunter2" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = post(
        &app,
        "/api/admin/login",
        json!({ "email": "meera@example.com", "password": "wrong" }),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_login_matches_email_exactly_as_signed_up() -> Result<()> {
    let app = test_app();
    let body = json!({ "email": "pad@example.com ", "password": "pw" });

    let (status, _) = post(&app, "/api/admin/signup", body.clone()).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, reply) = post(&app, "/api/admin/login", body).await?;
    assert_eq!(status, StatusCode::OK, "{}", reply);
    Ok(())
}

#[tokio::test]
async fn surveyor_validation_names_only_missing_fields() -> Result<()> {
    let app = test_app();
    let (status, body) = post(&app, "/api/surveyor/register", json!({ "id": "S001", "password": "" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"], json!({ "password": "This field is required" }));
    Ok(())
}

#[tokio::test]
async fn admin_signup_rejects_missing_fields_and_duplicates() -> Result<()> {
    let app = test_app();

    let (status, body) = post(&app, "/api/admin/signup", json!({ "email": "a@example.com" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["password"].is_string());

    let signup = json!({ "email": "a@example.com", "password": "pw" });
    let (status, _) = post(&app, "/api/admin/signup", signup.clone()).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = post(&app, "/api/admin/signup", signup).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn admin_login_accepts_any_identifier_key_and_fallback() -> Result<()> {
    let app = test_app();

    for key in ["email", "id", "username"] {
        let (status, _) = post(
            &app,
            "/api/admin/login",
            json!({ key: "admin@example.com", "password": "admin123" }),
        )
        .await?;
        assert_eq!(status, StatusCode::OK, "identifier key {}", key);
    }

    let (status, _) = post(&app, "/api/admin/login", json!({ "password": "admin123" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn admin_listing_hides_password_hashes() -> Result<()> {
    let app = test_app();
    post(&app, "/api/admin/signup", json!({ "email": "a@example.com", "password": "pw" })).await?;

    let (status, body) = get(&app, "/api/admins").await?;
    assert_eq!(status, StatusCode::OK);
    let admins = body.as_array().expect("array");
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0]["email"], "a@example.com");
    assert!(admins[0].get("password").is_none());
    assert!(admins[0].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn developer_login_uses_configured_credential() -> Result<()> {
    let app = test_app();

    let (status, body) = post(
        &app,
        "/api/developer/login",
        json!({ "email": DEVELOPER_EMAIL, "password": DEVELOPER_PASSWORD }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = post(
        &app,
        "/api/developer/login",
        json!({ "email": DEVELOPER_EMAIL, "password": "nope" }),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post(&app, "/api/developer/login", json!({ "email": DEVELOPER_EMAIL })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn surveyor_register_conflict_and_login() -> Result<()> {
    let app = test_app();
    let creds = json!({ "id": "S001", "password": "field-pass" });

    let (status, body) = post(&app, "/api/surveyor/register", creds.clone()).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["message"].is_string());

    let (status, _) = post(&app, "/api/surveyor/register", creds.clone()).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = post(
        &app,
        "/api/surveyor/login",
        json!({ "id": "S001", "password": "wrong" }),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = post(&app, "/api/surveyor/login", creds).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _) = post(&app, "/api/surveyor/login", json!({ "id": "S404", "password": "x" })).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn surveyor_listing_hides_password_hashes() -> Result<()> {
    let app = test_app();
    post(&app, "/api/surveyor/register", json!({ "id": "S001", "password": "pw" })).await?;
    post(&app, "/api/surveyor/register", json!({ "id": "S002", "password": "pw" })).await?;

    let (status, body) = get(&app, "/api/surveyors").await?;
    assert_eq!(status, StatusCode::OK);
    let surveyors = body.as_array().expect("array");
    assert_eq!(surveyors.len(), 2);
    for surveyor in surveyors {
        assert!(surveyor["id"].is_string());
        assert!(surveyor.get("password").is_none());
        assert!(surveyor.get("password_hash").is_none());
    }
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_invalid_json() -> Result<()> {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/surveyor/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"id\": \"S001\","))?;

    let (status, body) = send_request(&app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}
