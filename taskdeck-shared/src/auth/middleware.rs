/// Authentication context and errors for the HTTP layer
///
/// The API server's auth middleware resolves the `Authorization: Token <...>`
/// header against the stored token hashes and, on success, inserts an
/// [`AuthContext`] into the request extensions. Handlers extract it with
/// Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskdeck_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication context added to request extensions after a token resolves
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// ID of the token row that authenticated this request
    ///
    /// Logout revokes exactly this token, leaving the user's other sessions
    /// untouched.
    pub token_id: Uuid,
}

impl AuthContext {
    pub fn new(user_id: Uuid, token_id: Uuid) -> Self {
        Self { user_id, token_id }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Malformed authorization header or token
    InvalidFormat(String),

    /// Token unknown or revoked
    InvalidToken,

    /// Database error during token resolution
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Invalid or revoked token").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Extracts the token from an `Authorization: Token <token>` header value
///
/// The scheme name is matched case-sensitively, mirroring the frontend
/// contract.
pub fn parse_token_header(header_value: &str) -> Result<&str, AuthError> {
    header_value
        .strip_prefix("Token ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected 'Token <token>' header".to_string()))
}
