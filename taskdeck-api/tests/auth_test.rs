/// Integration tests for the account surface:
/// - Registration (validation, duplicate email)
/// - Login (fresh token per login, credential errors)
/// - Logout (actual storage-side revocation, scoped to one token)
/// - Email lookup

mod common;

use axum::http::StatusCode;
use common::{send, TestContext};
use serde_json::json;
use uuid::Uuid;

fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}

#[tokio::test]
async fn test_registration_issues_working_token() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("register");

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/api/registration",
        None,
        Some(json!({
            "fullname": "Jane Doe",
            "email": email,
            "password": "hunter2hunter2",
            "repeated_password": "hunter2hunter2"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fullname"], "Jane Doe");
    assert_eq!(body["email"], email);
    assert!(body["user_id"].is_string());

    let token = body["token"].as_str().unwrap().to_string();
    assert!(token.starts_with("deck_"));

    // The token authenticates immediately
    let (status, boards) = send(&ctx.app, "GET", "/api/boards", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(boards.as_array().unwrap().is_empty());

    ctx.delete_user_by_email(&email).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_registration_password_mismatch() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = send(
        &ctx.app,
        "POST",
        "/api/registration",
        None,
        Some(json!({
            "fullname": "Jane Doe",
            "email": unique_email("mismatch"),
            "password": "hunter2hunter2",
            "repeated_password": "different-password"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_registration_duplicate_email() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("duplicate");

    let register = json!({
        "fullname": "Jane Doe",
        "email": email,
        "password": "hunter2hunter2",
        "repeated_password": "hunter2hunter2"
    });

    let (status, _) = send(&ctx.app, "POST", "/api/registration", None, Some(register.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&ctx.app, "POST", "/api/registration", None, Some(register)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    ctx.delete_user_by_email(&email).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_login_and_invalid_credentials() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("login");

    let (status, _) = send(
        &ctx.app,
        "POST",
        "/api/registration",
        None,
        Some(json!({
            "fullname": "Jane Doe",
            "email": email,
            "password": "hunter2hunter2",
            "repeated_password": "hunter2hunter2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Correct credentials issue a fresh token
    let (status, body) = send(
        &ctx.app,
        "POST",
        "/api/login",
        None,
        Some(json!({"email": email, "password": "hunter2hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().unwrap().starts_with("deck_"));

    // Wrong password and unknown email are indistinguishable
    let (status, _) = send(
        &ctx.app,
        "POST",
        "/api/login",
        None,
        Some(json!({"email": email, "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &ctx.app,
        "POST",
        "/api/login",
        None,
        Some(json!({"email": unique_email("nobody"), "password": "hunter2hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.delete_user_by_email(&email).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_logout_revokes_only_the_presented_token() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email("logout");

    let (_, body) = send(
        &ctx.app,
        "POST",
        "/api/registration",
        None,
        Some(json!({
            "fullname": "Jane Doe",
            "email": email,
            "password": "hunter2hunter2",
            "repeated_password": "hunter2hunter2"
        })),
    )
    .await;
    let first_token = body["token"].as_str().unwrap().to_string();

    // Second session for the same account
    let (_, body) = send(
        &ctx.app,
        "POST",
        "/api/login",
        None,
        Some(json!({"email": email, "password": "hunter2hunter2"})),
    )
    .await;
    let second_token = body["token"].as_str().unwrap().to_string();

    let (status, _) = send(&ctx.app, "POST", "/api/logout", Some(&first_token), None).await;
    assert_eq!(status, StatusCode::OK);

    // The logged-out token no longer authenticates
    let (status, _) = send(&ctx.app, "GET", "/api/boards", Some(&first_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The other session is untouched
    let (status, _) = send(&ctx.app, "GET", "/api/boards", Some(&second_token), None).await;
    assert_eq!(status, StatusCode::OK);

    ctx.delete_user_by_email(&email).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_missing_or_malformed_token_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let (status, _) = send(&ctx.app, "GET", "/api/boards", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&ctx.app, "GET", "/api/boards", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_email_check() {
    let ctx = TestContext::new().await.unwrap();
    let (user, token) = ctx.create_user("Checked User").await.unwrap();

    let (status, body) = send(
        &ctx.app,
        "GET",
        &format!("/api/email-check?email={}", user.email),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user.id.to_string());
    assert_eq!(body["fullname"], "Checked User");

    let (status, body) = send(
        &ctx.app,
        "GET",
        &format!("/api/email-check?email={}", unique_email("missing")),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);

    ctx.cleanup().await.unwrap();
}
