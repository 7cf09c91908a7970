/// Task endpoints
///
/// Tasks live inside boards; every operation resolves the task's board and
/// consults the policy module before touching storage. Board existence is
/// checked before access, so a missing board is 404 rather than a blanket
/// 403.
///
/// # Endpoints
///
/// - `POST /api/tasks` - Create a task on a board
/// - `GET /api/tasks/assigned-to-me` - Tasks where the caller is assignee
/// - `GET /api/tasks/reviewing` - Tasks where the caller is reviewer
/// - `GET /api/tasks/:id` - Task detail
/// - `PATCH /api/tasks/:id` - Partial update
/// - `DELETE /api/tasks/:id` - Delete (creator or board owner only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use taskdeck_shared::{
    auth::{middleware::AuthContext, policy},
    models::{
        board::Board,
        comment::Comment,
        task::{double_option, CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
        user::{User, UserSummary},
    },
};
use uuid::Uuid;

/// Decorated task for API responses
///
/// Assignee and reviewer are resolved to full user summaries;
/// `comments_count` is computed at read time.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,

    /// Board the task belongs to
    pub board: Uuid,

    pub title: Option<String>,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: Option<UserSummary>,
    pub reviewer: Option<UserSummary>,
    pub due_date: Option<NaiveDate>,
    pub comments_count: i64,
}

/// Create task request
///
/// `status` and `priority` arrive as strings and are validated against the
/// closed enumerations, so an invalid value is a 400 with a useful message.
/// An omitted assignee defaults to the requester.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Target board
    pub board: Uuid,

    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
}

/// Partial update request
///
/// For nullable fields the patch distinguishes three states: absent
/// (untouched), `null` (cleared), and a value (set).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<String>,
    pub priority: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    pub reviewer_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Parses a status string, rejecting unknown values with a 400
fn parse_status(s: &str) -> ApiResult<TaskStatus> {
    TaskStatus::from_str(s).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid status '{}': expected one of to-do, in-progress, review, done",
            s
        ))
    })
}

/// Parses a priority string, rejecting unknown values with a 400
fn parse_priority(s: &str) -> ApiResult<TaskPriority> {
    TaskPriority::from_str(s).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid priority '{}': expected one of low, medium, high",
            s
        ))
    })
}

/// Rejects user references that don't resolve
async fn require_existing_user(state: &AppState, id: Uuid, field: &str) -> ApiResult<()> {
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::BadRequest(format!("Unknown {}: {}", field, id)));
    }
    Ok(())
}

/// Resolves a task and its board, surfacing 404 before any policy check
async fn resolve_task(state: &AppState, task_id: Uuid) -> ApiResult<(Task, Board, Vec<Uuid>)> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let board = Board::find_by_id(&state.db, task.board_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Task references missing board".to_string()))?;

    let member_ids = Board::member_ids(&state.db, board.id).await?;

    Ok((task, board, member_ids))
}

/// Decorates a batch of tasks with resolved users and comment counts
///
/// Users and comment counts are loaded with one query each, regardless of
/// the number of tasks.
pub(crate) async fn decorate_tasks(
    state: &AppState,
    tasks: Vec<Task>,
) -> ApiResult<Vec<TaskResponse>> {
    let mut user_ids: Vec<Uuid> = tasks
        .iter()
        .flat_map(|t| [t.assignee_id, t.reviewer_id])
        .flatten()
        .collect();
    user_ids.sort();
    user_ids.dedup();

    let users: HashMap<Uuid, UserSummary> = User::find_by_ids(&state.db, &user_ids)
        .await?
        .iter()
        .map(|u| (u.id, u.summary()))
        .collect();

    let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
    let comment_counts = Comment::count_for_tasks(&state.db, &task_ids).await?;

    Ok(tasks
        .into_iter()
        .map(|t| TaskResponse {
            comments_count: comment_counts.get(&t.id).copied().unwrap_or(0),
            assignee: t.assignee_id.and_then(|id| users.get(&id).cloned()),
            reviewer: t.reviewer_id.and_then(|id| users.get(&id).cloned()),
            id: t.id,
            board: t.board_id,
            title: t.title,
            description: t.description,
            status: t.status,
            priority: t.priority,
            due_date: t.due_date,
        })
        .collect())
}

/// Decorates a single task
async fn decorate_task(state: &AppState, task: Task) -> ApiResult<TaskResponse> {
    let mut decorated = decorate_tasks(state, vec![task]).await?;
    decorated
        .pop()
        .ok_or_else(|| ApiError::InternalError("Task decoration produced no result".to_string()))
}

/// Create a task on a board
///
/// The board must exist (404 otherwise) and the requester must be its owner
/// or a member (403). The check runs before anything is persisted.
///
/// # Errors
///
/// - `404 Not Found`: board does not exist
/// - `403 Forbidden`: requester is neither owner nor member
/// - `400 Bad Request`: invalid status/priority value, or an
///   assignee/reviewer id that references no user
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let board = Board::find_by_id(&state.db, req.board)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    let member_ids = Board::member_ids(&state.db, board.id).await?;
    if !policy::can_create_task_on_board(auth.user_id, &board, &member_ids) {
        return Err(ApiError::Forbidden("Not a member of this board".to_string()));
    }

    let status = match req.status.as_deref() {
        Some(s) => parse_status(s)?,
        None => TaskStatus::default(),
    };
    let priority = match req.priority.as_deref() {
        Some(p) => parse_priority(p)?,
        None => TaskPriority::default(),
    };

    if let Some(assignee_id) = req.assignee_id {
        require_existing_user(&state, assignee_id, "assignee_id").await?;
    }
    if let Some(reviewer_id) = req.reviewer_id {
        require_existing_user(&state, reviewer_id, "reviewer_id").await?;
    }

    // An omitted assignee defaults to the requester
    let assignee_id = req.assignee_id.or(Some(auth.user_id));

    let task = Task::create(
        &state.db,
        CreateTask {
            board_id: board.id,
            title: req.title,
            description: req.description,
            status,
            priority,
            assignee_id,
            reviewer_id: req.reviewer_id,
            due_date: req.due_date,
            created_by: auth.user_id,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, board_id = %board.id, "Created task");

    let decorated = decorate_task(&state, task).await?;
    Ok((StatusCode::CREATED, Json(decorated)))
}

/// Tasks where the caller is the assignee
pub async fn assigned_to_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = Task::list_by_assignee(&state.db, auth.user_id).await?;
    Ok(Json(decorate_tasks(&state, tasks).await?))
}

/// Tasks where the caller is the reviewer
pub async fn reviewing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = Task::list_by_reviewer(&state.db, auth.user_id).await?;
    Ok(Json(decorate_tasks(&state, tasks).await?))
}

/// Task detail view
///
/// # Errors
///
/// - `404 Not Found` / `403 Forbidden`
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let (task, board, member_ids) = resolve_task(&state, task_id).await?;

    if !policy::can_access_task(auth.user_id, &board, &member_ids) {
        return Err(ApiError::Forbidden("Not a member of this board".to_string()));
    }

    Ok(Json(decorate_task(&state, task).await?))
}

/// Partially update a task
///
/// Any owner or member of the task's board may update any field, including
/// setting the status directly to any of the four values; there is no
/// transition graph. Nullable fields are cleared with an explicit `null`.
///
/// # Errors
///
/// - `404 Not Found` / `403 Forbidden`
/// - `400 Bad Request`: invalid enum value or unknown user reference
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let (task, board, member_ids) = resolve_task(&state, task_id).await?;

    if !policy::can_access_task(auth.user_id, &board, &member_ids) {
        return Err(ApiError::Forbidden("Not a member of this board".to_string()));
    }

    let status = req.status.as_deref().map(parse_status).transpose()?;
    let priority = req.priority.as_deref().map(parse_priority).transpose()?;

    if let Some(Some(assignee_id)) = req.assignee_id {
        require_existing_user(&state, assignee_id, "assignee_id").await?;
    }
    if let Some(Some(reviewer_id)) = req.reviewer_id {
        require_existing_user(&state, reviewer_id, "reviewer_id").await?;
    }

    let updated = Task::update(
        &state.db,
        task.id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status,
            priority,
            assignee_id: req.assignee_id,
            reviewer_id: req.reviewer_id,
            due_date: req.due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(decorate_task(&state, updated).await?))
}

/// Delete a task
///
/// Only the task's creator or the board's owner may delete; a plain board
/// member gets 403. Comments cascade in the same transaction.
///
/// # Errors
///
/// - `404 Not Found` / `403 Forbidden`
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let (task, board, _member_ids) = resolve_task(&state, task_id).await?;

    if !policy::can_delete_task(auth.user_id, &task, &board) {
        return Err(ApiError::Forbidden(
            "Only the task creator or board owner may delete a task".to_string(),
        ));
    }

    Task::delete_cascade(&state.db, task.id).await?;

    tracing::info!(task_id = %task.id, user_id = %auth.user_id, "Deleted task");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_rejects_unknown_values() {
        assert!(parse_status("to-do").is_ok());
        assert!(parse_status("done").is_ok());

        let err = parse_status("doing").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_parse_priority_rejects_unknown_values() {
        assert!(parse_priority("high").is_ok());

        let err = parse_priority("urgent").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let patch: UpdateTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(patch.assignee_id.is_none());

        let patch: UpdateTaskRequest = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
        assert_eq!(patch.assignee_id, Some(None));

        let id = Uuid::new_v4();
        let patch: UpdateTaskRequest =
            serde_json::from_str(&format!(r#"{{"assignee_id": "{}"}}"#, id)).unwrap();
        assert_eq!(patch.assignee_id, Some(Some(id)));
    }
}
