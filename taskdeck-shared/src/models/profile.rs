/// User profile model
///
/// Profiles carry optional presentation data (bio, location) that does not
/// belong on the account row itself. Every user has at most one profile row;
/// reads treat a missing row as an empty profile.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_profiles (
///     user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
///     bio TEXT,
///     location VARCHAR(100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Profile row for a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    /// Owning user
    pub user_id: Uuid,

    /// Optional short biography
    pub bio: Option<String>,

    /// Optional location (e.g. city, country)
    pub location: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for updating a profile; omitted fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl UserProfile {
    /// Inserts an empty profile row for a freshly registered user.
    pub async fn create_empty(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id)
            VALUES ($1)
            RETURNING user_id, bio, location, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(profile)
    }

    /// Finds the profile for a user, None if no row exists.
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, bio, location, created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Applies a partial update, creating the row if it does not exist yet.
    ///
    /// Only fields present in `data` are written; the upsert keeps the other
    /// columns as they were.
    pub async fn upsert(
        pool: &PgPool,
        user_id: Uuid,
        data: UpdateProfile,
    ) -> Result<Self, sqlx::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, bio, location)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET bio = COALESCE($2, user_profiles.bio),
                location = COALESCE($3, user_profiles.location),
                updated_at = NOW()
            RETURNING user_id, bio, location, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.bio)
        .bind(data.location)
        .fetch_one(pool)
        .await?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_default() {
        let update = UpdateProfile::default();
        assert!(update.bio.is_none());
        assert!(update.location.is_none());
    }
}
