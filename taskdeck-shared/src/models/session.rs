/// Issued authentication tokens
///
/// This module stores the server side of the opaque-token scheme: one row per
/// issued token, holding only the SHA-256 digest of the token. The plaintext
/// exists exactly once, in the registration/login response. Logging out
/// deletes the row, which revokes the token immediately.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auth_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash VARCHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::auth::token::generate_token;
/// use taskdeck_shared::models::session::AuthToken;
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let (plaintext, hash) = generate_token();
/// let token = AuthToken::create(&pool, user_id, &hash).await?;
///
/// // Later: resolve an incoming token
/// let found = AuthToken::find_by_hash(&pool, &hash).await?;
/// assert!(found.is_some());
///
/// // Logout revokes it
/// AuthToken::revoke(&pool, token.id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A stored (hashed) authentication token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthToken {
    /// Token row ID
    pub id: Uuid,

    /// User this token authenticates
    pub user_id: Uuid,

    /// SHA-256 hex digest of the plaintext token
    pub token_hash: String,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    /// Stores a newly issued token hash for a user
    ///
    /// Each login issues a fresh token; existing tokens for the same user
    /// stay valid until they are individually revoked.
    pub async fn create(pool: &PgPool, user_id: Uuid, token_hash: &str) -> Result<Self, sqlx::Error> {
        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (user_id, token_hash)
            VALUES ($1, $2)
            RETURNING id, user_id, token_hash, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_one(pool)
        .await?;

        Ok(token)
    }

    /// Resolves a token hash to its row, None if unknown or revoked
    pub async fn find_by_hash(pool: &PgPool, token_hash: &str) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT id, user_id, token_hash, created_at
            FROM auth_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Revokes a single token (storage-side deletion)
    ///
    /// # Returns
    ///
    /// True if a token was revoked, false if it didn't exist
    pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every token issued to a user
    ///
    /// Used when an account is disabled; returns the number of revoked tokens.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_token_serializes_hash_not_plaintext() {
        let token = AuthToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "a".repeat(64),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&token).unwrap();
        assert!(json.contains("token_hash"));
    }
}
