/// Task model and database operations
///
/// Tasks belong to exactly one board (fixed at creation) and carry a
/// workflow status, a priority, and optional assignee/reviewer references.
/// There is no enforced status transition graph: any authorized mutator may
/// set any of the four statuses directly.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('to-do', 'in-progress', 'review', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(150),
///     description VARCHAR(250),
///     status task_status NOT NULL DEFAULT 'to-do',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     reviewer_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     due_date DATE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::task::{Task, CreateTask, TaskPriority, TaskStatus};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, board_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     board_id,
///     title: Some("Fix bug".to_string()),
///     description: None,
///     status: TaskStatus::ToDo,
///     priority: TaskPriority::High,
///     assignee_id: Some(user_id),
///     reviewer_id: None,
///     due_date: None,
///     created_by: user_id,
/// }).await?;
///
/// let mine = Task::list_by_assignee(&pool, user_id).await?;
/// assert!(mine.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Workflow status of a task
///
/// A flat set, not a state machine: tasks may move between any two statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet (the default)
    ToDo,

    /// Being worked on
    InProgress,

    /// Waiting for review
    Review,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to-do",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    /// Parses a status from its wire string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "to-do" => Some(TaskStatus::ToDo),
            "in-progress" => Some(TaskStatus::InProgress),
            "review" => Some(TaskStatus::Review),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::ToDo
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }

    /// Parses a priority from its wire string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Board this task belongs to (immutable after creation)
    pub board_id: Uuid,

    /// Optional short title
    pub title: Option<String>,

    /// Optional short description
    pub description: Option<String>,

    /// Current workflow status
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// User responsible for completing the task (nulled if the user is deleted)
    pub assignee_id: Option<Uuid>,

    /// User responsible for reviewing the task (nulled if the user is deleted)
    pub reviewer_id: Option<Uuid>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// User who created the task (nulled if the user is deleted)
    pub created_by: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// Board existence and the creator's access are validated by the caller
/// before this insert runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub board_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub created_by: Uuid,
}

/// Deserializes a present field (including an explicit `null`) into
/// `Some(...)`, so a missing field (outer `None` via `#[serde(default)]`)
/// stays distinguishable from `"field": null`.
///
/// Shared with the API layer's patch DTOs, which carry the same
/// present/null/value distinction.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Input for partially updating a task
///
/// Outer `None` leaves the column untouched; `Some(None)` on a nullable
/// column clears it explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default)]
    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    pub reviewer_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl UpdateTask {
    /// True when the patch carries no field at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assignee_id.is_none()
            && self.reviewer_id.is_none()
            && self.due_date.is_none()
    }
}

/// Task counts for one board, computed in a single statement so the three
/// values are mutually consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardTaskStats {
    /// All tasks on the board
    pub ticket_count: i64,

    /// Tasks with status `to-do`
    pub to_do_count: i64,

    /// Tasks with priority `high`
    pub high_prio_count: i64,
}

const TASK_COLUMNS: &str = "id, board_id, title, description, status, priority, \
                            assignee_id, reviewer_id, due_date, created_by, \
                            created_at, updated_at";

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO tasks (board_id, title, description, status, priority,
                               assignee_id, reviewer_id, due_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TASK_COLUMNS}
            "#
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.board_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status)
            .bind(data.priority)
            .bind(data.assignee_id)
            .bind(data.reviewer_id)
            .bind(data.due_date)
            .bind(data.created_by)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Lists all tasks of a board, oldest first
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE board_id = $1 ORDER BY created_at ASC, id ASC"
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(board_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Lists tasks where the user is the assignee
    ///
    /// Scoped by the direct relationship; no board-visibility pre-filter is
    /// needed.
    pub async fn list_by_assignee(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE assignee_id = $1 ORDER BY created_at ASC, id ASC"
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Lists tasks where the user is the reviewer
    pub async fn list_by_reviewer(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE reviewer_id = $1 ORDER BY created_at ASC, id ASC"
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Applies a partial update to a task
    ///
    /// Only fields present in `data` are written; `updated_at` is always
    /// refreshed. Returns the updated task, or None if it doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if data.assignee_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assignee_id = ${}", bind_count));
        }
        if data.reviewer_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", reviewer_id = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(assignee_id) = data.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(reviewer_id) = data.reviewer_id {
            q = q.bind(reviewer_id);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task and its comments
    ///
    /// The cascade is explicit and transactional: comments first, then the
    /// task row.
    ///
    /// # Returns
    ///
    /// True if the task existed and was deleted
    pub async fn delete_cascade(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE task_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Computes the task counts for a board
    ///
    /// One statement, so ticket/to-do/high-priority counts are
    /// snapshot-consistent with each other even under concurrent writes.
    pub async fn stats_for_board(
        pool: &PgPool,
        board_id: Uuid,
    ) -> Result<BoardTaskStats, sqlx::Error> {
        let (ticket_count, to_do_count, high_prio_count): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'to-do'),
                   COUNT(*) FILTER (WHERE priority = 'high')
            FROM tasks
            WHERE board_id = $1
            "#,
        )
        .bind(board_id)
        .fetch_one(pool)
        .await?;

        Ok(BoardTaskStats {
            ticket_count,
            to_do_count,
            high_prio_count,
        })
    }
}
