/// Board model and database operations
///
/// A board groups tasks and has exactly one owner plus a set of members.
/// The owner is fixed at creation and never reassigned; members are stored
/// in the `board_members` join table and replaced wholesale on update.
/// The owner is deliberately not auto-added to the member set: every access
/// check treats "owner or member" as a single predicate.
///
/// All aggregate values (member count, task counts) are computed from live
/// state at read time and never persisted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(100),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE board_members (
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::board::{Board, CreateBoard};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid, member: Uuid) -> Result<(), sqlx::Error> {
/// let board = Board::create(&pool, CreateBoard {
///     title: Some("Sprint 1".to_string()),
///     owner_id: owner,
///     member_ids: vec![member],
/// }).await?;
///
/// // Both the owner and the member see it
/// let visible = Board::list_visible(&pool, member).await?;
/// assert!(visible.iter().any(|b| b.id == board.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Board model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Optional board title
    pub title: Option<String>,

    /// Owning user, set at creation, never reassigned
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    /// Optional title
    pub title: Option<String>,

    /// Owner (the requesting user)
    pub owner_id: Uuid,

    /// Initial member set; ids must already be validated against `users`
    pub member_ids: Vec<Uuid>,
}

impl Board {
    /// Creates a board together with its initial member set
    ///
    /// Board row and membership rows are inserted in one transaction so a
    /// board is never observable without its members.
    pub async fn create(pool: &PgPool, data: CreateBoard) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        for user_id in &data.member_ids {
            sqlx::query(
                r#"
                INSERT INTO board_members (board_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT (board_id, user_id) DO NOTHING
                "#,
            )
            .bind(board.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(board)
    }

    /// Finds a board by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, title, owner_id, created_at, updated_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Lists every board the user may see: boards they own plus boards they
    /// are a member of, deduplicated
    ///
    /// A user who is both owner and member of the same board appears once.
    /// Ordering is by creation time for stable listings; it is not part of
    /// the API contract.
    pub async fn list_visible(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let boards = sqlx::query_as::<_, Board>(
            r#"
            SELECT DISTINCT b.id, b.title, b.owner_id, b.created_at, b.updated_at
            FROM boards b
            LEFT JOIN board_members bm ON bm.board_id = b.id
            WHERE b.owner_id = $1 OR bm.user_id = $1
            ORDER BY b.created_at ASC, b.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(boards)
    }

    /// Returns the member ids of a board
    pub async fn member_ids(pool: &PgPool, board_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let ids: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT user_id
            FROM board_members
            WHERE board_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Counts members of a board
    ///
    /// Always computed from the join table; never cached.
    pub async fn member_count(pool: &PgPool, board_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM board_members WHERE board_id = $1")
                .bind(board_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Replaces the member set of a board
    ///
    /// Replace semantics: the existing set is dropped and the given ids
    /// inserted, in one transaction. Callers that want to leave the set
    /// untouched simply don't call this.
    pub async fn set_members(
        pool: &PgPool,
        board_id: Uuid,
        member_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM board_members WHERE board_id = $1")
            .bind(board_id)
            .execute(&mut *tx)
            .await?;

        for user_id in member_ids {
            sqlx::query(
                r#"
                INSERT INTO board_members (board_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT (board_id, user_id) DO NOTHING
                "#,
            )
            .bind(board_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE boards SET updated_at = NOW() WHERE id = $1")
            .bind(board_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Updates the board title
    pub async fn update_title(
        pool: &PgPool,
        board_id: Uuid,
        title: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET title = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(board_id)
        .bind(title)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Deletes a board and everything under it
    ///
    /// The cascade is explicit and transactional: comments of the board's
    /// tasks, then the tasks, then the memberships, then the board itself.
    /// Concurrent readers never observe orphaned tasks or comments.
    ///
    /// # Returns
    ///
    /// True if the board existed and was deleted
    pub async fn delete_cascade(pool: &PgPool, board_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM comments
            WHERE task_id IN (SELECT id FROM tasks WHERE board_id = $1)
            "#,
        )
        .bind(board_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM tasks WHERE board_id = $1")
            .bind(board_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM board_members WHERE board_id = $1")
            .bind(board_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(board_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_board_struct() {
        let owner = Uuid::new_v4();
        let create = CreateBoard {
            title: Some("Sprint 1".to_string()),
            owner_id: owner,
            member_ids: vec![],
        };

        assert_eq!(create.title.as_deref(), Some("Sprint 1"));
        assert_eq!(create.owner_id, owner);
        assert!(create.member_ids.is_empty());
    }

    // Integration tests for database operations are in taskdeck-api/tests/.
}
