/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (migrations run on connect)
/// - Test user creation with issued tokens
/// - Request helpers driving the router through tower::Service
/// - Cleanup that removes created users (cascading their boards and tasks)

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use std::sync::Mutex;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::Config;
use taskdeck_shared::auth::token::generate_token;
use taskdeck_shared::models::session::AuthToken;
use taskdeck_shared::models::user::{CreateUser, User};
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    created_users: Mutex<Vec<Uuid>>,
}

impl TestContext {
    /// Creates a new test context with a migrated database and built router
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            created_users: Mutex::new(Vec::new()),
        })
    }

    /// Creates a test user directly through the models and issues a token
    ///
    /// Emails are randomized so tests can run concurrently against the same
    /// database.
    pub async fn create_user(&self, name: &str) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("{}-{}@example.com", name, Uuid::new_v4()),
                password_hash: "test_hash".to_string(), // Not used by these tests
                name: Some(name.to_string()),
            },
        )
        .await?;

        let (plaintext, hash) = generate_token();
        AuthToken::create(&self.db, user.id, &hash).await?;

        self.created_users.lock().unwrap().push(user.id);

        Ok((user, plaintext))
    }

    /// Removes an account created through the HTTP registration endpoint
    pub async fn delete_user_by_email(&self, email: &str) -> anyhow::Result<()> {
        if let Some(user) = User::find_by_email(&self.db, email).await? {
            User::delete(&self.db, user.id).await?;
        }
        Ok(())
    }

    /// Cleans up test data
    ///
    /// Deleting the users cascades to their tokens and owned boards (and
    /// those boards' tasks and comments).
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        let ids: Vec<Uuid> = self.created_users.lock().unwrap().drain(..).collect();
        for id in ids {
            User::delete(&self.db, id).await?;
        }
        Ok(())
    }
}

/// Builds the authorization header value for a token
pub fn auth_header(token: &str) -> String {
    format!("Token {}", token)
}

/// Sends one request through the router and returns (status, parsed body)
///
/// The body is `Value::Null` for empty responses (204s).
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", auth_header(token));
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().call(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}
