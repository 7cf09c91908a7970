/// Authentication endpoints
///
/// This module provides account endpoints:
/// - Registration
/// - Login
/// - Logout (storage-side token revocation)
/// - Email existence lookup
///
/// # Endpoints
///
/// - `POST /api/registration` - Register new user and issue a token
/// - `POST /api/login` - Login and issue a fresh token
/// - `POST /api/logout` - Revoke the presented token
/// - `GET /api/email-check?email=` - Look up a user by email

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{middleware::AuthContext, password, token},
    models::{
        profile::UserProfile,
        session::AuthToken,
        user::{CreateUser, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 150, message = "Name must be 1-150 characters"))]
    pub fullname: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Password confirmation; must match `password`
    pub repeated_password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Token payload returned by registration and login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Opaque session token; shown exactly once
    pub token: String,

    /// Display name of the account
    pub fullname: String,

    /// Email address
    pub email: String,

    /// User ID
    pub user_id: Uuid,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Email check query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct EmailCheckQuery {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Email check response: the matching user, or an explicit not-found shape
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EmailCheckResponse {
    Found {
        id: Uuid,
        email: String,
        fullname: String,
    },
    NotFound {
        exists: bool,
    },
}

/// Register a new user
///
/// Creates the account, an empty profile row, and issues the first session
/// token. The requester is logged in immediately.
///
/// # Endpoint
///
/// ```text
/// POST /api/registration
/// Content-Type: application/json
///
/// {
///   "fullname": "Jane Doe",
///   "email": "jane@example.com",
///   "password": "hunter2hunter2",
///   "repeated_password": "hunter2hunter2"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: invalid email, short password, password
///   mismatch, or an already registered email
/// - `500 Internal Server Error`: server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    if req.password != req.repeated_password {
        return Err(ApiError::validation(
            "repeated_password",
            "Passwords do not match",
        ));
    }

    // Checked up front for a field-level error; the unique constraint on
    // users.email still backstops concurrent registrations.
    if User::email_exists(&state.db, &req.email).await? {
        return Err(ApiError::validation("email", "Email already exists"));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.clone(),
            password_hash,
            name: Some(req.fullname.clone()),
        },
    )
    .await?;

    UserProfile::create_empty(&state.db, user.id).await?;

    let (plaintext, hash) = token::generate_token();
    AuthToken::create(&state.db, user.id, &hash).await?;

    tracing::info!(user_id = %user.id, "Registered new user");

    Ok(Json(TokenResponse {
        token: plaintext,
        fullname: user.fullname(),
        email: user.email,
        user_id: user.id,
    }))
}

/// Login endpoint
///
/// Authenticates a user and issues a fresh session token. Unknown email and
/// wrong password produce the same response so the endpoint does not leak
/// which accounts exist.
///
/// # Errors
///
/// - `401 Unauthorized`: invalid credentials
/// - `422 Unprocessable Entity`: malformed request
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let (plaintext, hash) = token::generate_token();
    AuthToken::create(&state.db, user.id, &hash).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse {
        token: plaintext,
        fullname: user.fullname(),
        email: user.email,
        user_id: user.id,
    }))
}

/// Logout endpoint
///
/// Deletes the presented token's row, revoking it immediately. Other
/// sessions of the same user stay valid.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<LogoutResponse>> {
    AuthToken::revoke(&state.db, auth.token_id).await?;

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// Email existence lookup
///
/// Used by the board member picker: resolves an email to a user summary, or
/// reports that no account exists. Lookup is case-insensitive.
pub async fn email_check(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Query(query): Query<EmailCheckQuery>,
) -> ApiResult<Json<EmailCheckResponse>> {
    query.validate()?;

    let response = match User::find_by_email(&state.db, &query.email).await? {
        Some(user) => EmailCheckResponse::Found {
            id: user.id,
            fullname: user.fullname(),
            email: user.email,
        },
        None => EmailCheckResponse::NotFound { exists: false },
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            fullname: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            repeated_password: "hunter2hunter2".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            fullname: "Jane Doe".to_string(),
            email: "not-an-email".to_string(),
            password: "hunter2hunter2".to_string(),
            repeated_password: "hunter2hunter2".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            fullname: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: "short".to_string(),
            repeated_password: "short".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_email_check_response_shapes() {
        let found = EmailCheckResponse::Found {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            fullname: "Jane Doe".to_string(),
        };
        let json = serde_json::to_string(&found).unwrap();
        assert!(json.contains("fullname"));
        assert!(!json.contains("exists"));

        let not_found = EmailCheckResponse::NotFound { exists: false };
        let json = serde_json::to_string(&not_found).unwrap();
        assert_eq!(json, r#"{"exists":false}"#);
    }
}
