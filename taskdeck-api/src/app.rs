/// Application state and router builder
///
/// This module defines the shared application state and provides a function
/// to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::auth::middleware::{parse_token_header, AuthContext, AuthError};
use taskdeck_shared::auth::token;
use taskdeck_shared::models::session::AuthToken;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── POST /registration           # Public
///     ├── POST /login                  # Public
///     ├── POST /logout                 # Authenticated
///     ├── GET  /email-check            # Authenticated
///     ├── /profiles/:user_id           # Authenticated (GET, PATCH)
///     ├── /boards                      # Authenticated (GET, POST)
///     ├── /boards/:id                  # Authenticated (GET, PATCH, DELETE)
///     ├── POST /tasks                  # Authenticated
///     ├── GET  /tasks/assigned-to-me   # Authenticated
///     ├── GET  /tasks/reviewing        # Authenticated
///     ├── /tasks/:id                   # Authenticated (GET, PATCH, DELETE)
///     ├── /tasks/:id/comments          # Authenticated (GET, POST)
///     └── /tasks/:id/comments/:cid     # Authenticated (GET, DELETE)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Token authentication (per-route-group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth routes
    let public_routes = Router::new()
        .route("/registration", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Everything else requires a valid token
    let protected_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route("/email-check", get(routes::auth::email_check))
        .route(
            "/profiles/:user_id",
            get(routes::profiles::get_profile).patch(routes::profiles::update_profile),
        )
        .route(
            "/boards",
            get(routes::boards::list_boards).post(routes::boards::create_board),
        )
        .route(
            "/boards/:board_id",
            get(routes::boards::get_board)
                .patch(routes::boards::update_board)
                .delete(routes::boards::delete_board),
        )
        .route("/tasks", post(routes::tasks::create_task))
        .route("/tasks/assigned-to-me", get(routes::tasks::assigned_to_me))
        .route("/tasks/reviewing", get(routes::tasks::reviewing))
        .route(
            "/tasks/:task_id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/tasks/:task_id/comments",
            get(routes::comments::list_comments).post(routes::comments::add_comment),
        )
        .route(
            "/tasks/:task_id/comments/:comment_id",
            get(routes::comments::get_comment).delete(routes::comments::delete_comment),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Token authentication middleware layer
///
/// Extracts the token from the `Authorization: Token <token>` header,
/// resolves its hash against stored tokens, and injects an [`AuthContext`]
/// into the request extensions. Revoked tokens fail here: revocation deletes
/// the stored row, so the lookup misses.
async fn token_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let presented = parse_token_header(auth_header)?;

    // Cheap structural check before touching the database
    if !token::validate_token_format(presented) {
        return Err(AuthError::InvalidToken.into());
    }

    let stored = AuthToken::find_by_hash(&state.db, &token::hash_token(presented))
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::InvalidToken)?;

    let auth_context = AuthContext::new(stored.user_id, stored.id);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    // AppState construction and routing are exercised end-to-end by the
    // integration tests in tests/, which require a database.
}
