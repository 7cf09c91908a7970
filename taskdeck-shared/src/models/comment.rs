/// Comment model and database operations
///
/// Comments hang off exactly one task. Every lookup that takes a comment id
/// is compound (scoped by the task id), so a comment can never be read or
/// deleted through another task's URL.
///
/// Listing order is a committed contract: newest first, `created_at DESC`
/// with `id DESC` as the stability tie-break.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Comment model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,

    /// Task this comment belongs to (immutable)
    pub task_id: Uuid,

    /// Author, set to the requester at creation, never client-supplied
    pub author_id: Uuid,

    /// Text content
    pub content: String,

    /// Server timestamp at creation (immutable)
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a comment on a task
    pub async fn create(
        pool: &PgPool,
        task_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, author_id, content, created_at
            "#,
        )
        .bind(task_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Lists the comments of a task, newest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, content, created_at
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Finds a comment by id, scoped to a task
    ///
    /// Returns None both when the comment does not exist and when it exists
    /// on a different task; callers surface either case as not-found.
    pub async fn find_by_id_and_task(
        pool: &PgPool,
        id: Uuid,
        task_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, content, created_at
            FROM comments
            WHERE id = $1 AND task_id = $2
            "#,
        )
        .bind(id)
        .bind(task_id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Deletes a comment by id, scoped to a task
    ///
    /// # Returns
    ///
    /// True if the comment existed on that task and was deleted
    pub async fn delete_by_id_and_task(
        pool: &PgPool,
        id: Uuid,
        task_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND task_id = $2")
            .bind(id)
            .bind(task_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts comments on a single task
    pub async fn count_by_task(pool: &PgPool, task_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts comments for many tasks in one query
    ///
    /// Tasks without comments are absent from the map; callers default to 0.
    pub async fn count_for_tasks(
        pool: &PgPool,
        task_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, i64>, sqlx::Error> {
        if task_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT task_id, COUNT(*)
            FROM comments
            WHERE task_id = ANY($1)
            GROUP BY task_id
            "#,
        )
        .bind(task_ids)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_serialization() {
        let comment = Comment {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            content: "Looks good".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&comment).unwrap();
        assert!(json.contains("Looks good"));
        assert!(json.contains("task_id"));
    }

    // Integration tests for database operations are in taskdeck-api/tests/.
}
