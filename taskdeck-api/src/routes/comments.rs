/// Task comment endpoints
///
/// Comments are a sub-resource of tasks: every URL carries the task id, and
/// every comment lookup is scoped by it, so a comment can never be read or
/// deleted through another task's URL. A wrong pairing is a plain 404.
///
/// # Endpoints
///
/// - `GET /api/tasks/:id/comments` - List comments, newest first
/// - `POST /api/tasks/:id/comments` - Add a comment
/// - `GET /api/tasks/:id/comments/:cid` - Fetch one comment
/// - `DELETE /api/tasks/:id/comments/:cid` - Delete own comment

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{middleware::AuthContext, policy},
    models::{
        board::Board,
        comment::Comment,
        task::Task,
        user::User,
    },
};
use uuid::Uuid;

/// Decorated comment for API responses
///
/// The author is resolved to a display name; "former user" stands in when
/// the account no longer resolves.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: Uuid,

    /// Display name of the author
    pub author: String,

    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Add comment request
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
}

/// Resolves a task and gates comment access for the caller
///
/// Existence first: a missing task is 404 before any policy decision.
async fn resolve_task_for_comments(
    state: &AppState,
    task_id: Uuid,
    user_id: Uuid,
) -> ApiResult<Task> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let board = Board::find_by_id(&state.db, task.board_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Task references missing board".to_string()))?;

    let member_ids = Board::member_ids(&state.db, board.id).await?;
    if !policy::can_access_task_comments(user_id, &board, &member_ids) {
        return Err(ApiError::Forbidden("Not a member of this board".to_string()));
    }

    Ok(task)
}

/// Decorates comments with resolved author names
async fn decorate_comments(
    state: &AppState,
    comments: Vec<Comment>,
) -> ApiResult<Vec<CommentResponse>> {
    let mut author_ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
    author_ids.sort();
    author_ids.dedup();

    let authors: std::collections::HashMap<Uuid, String> =
        User::find_by_ids(&state.db, &author_ids)
            .await?
            .iter()
            .map(|u| (u.id, u.fullname()))
            .collect();

    Ok(comments
        .into_iter()
        .map(|c| CommentResponse {
            author: authors
                .get(&c.author_id)
                .cloned()
                .unwrap_or_else(|| "former user".to_string()),
            id: c.id,
            task_id: c.task_id,
            author_id: c.author_id,
            content: c.content,
            created_at: c.created_at,
        })
        .collect())
}

async fn decorate_comment(state: &AppState, comment: Comment) -> ApiResult<CommentResponse> {
    let mut decorated = decorate_comments(state, vec![comment]).await?;
    decorated
        .pop()
        .ok_or_else(|| ApiError::InternalError("Comment decoration produced no result".to_string()))
}

/// List the comments of a task, newest first
///
/// The ordering is a committed contract: `created_at` descending with the
/// comment id as tie-break.
///
/// # Errors
///
/// - `404 Not Found`: task does not exist
/// - `403 Forbidden`: caller is neither owner nor member of the board
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let task = resolve_task_for_comments(&state, task_id, auth.user_id).await?;

    let comments = Comment::list_by_task(&state.db, task.id).await?;
    Ok(Json(decorate_comments(&state, comments).await?))
}

/// Add a comment to a task
///
/// The author is always the requester; `created_at` is the server clock.
///
/// # Errors
///
/// - `404 Not Found` / `403 Forbidden`
/// - `400 Bad Request`: empty content
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let task = resolve_task_for_comments(&state, task_id, auth.user_id).await?;

    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Comment content must not be empty".to_string(),
        ));
    }

    let comment = Comment::create(&state.db, task.id, auth.user_id, &req.content).await?;

    tracing::info!(comment_id = %comment.id, task_id = %task.id, "Added comment");

    let decorated = decorate_comment(&state, comment).await?;
    Ok((StatusCode::CREATED, Json(decorated)))
}

/// Fetch a single comment of a task
///
/// The lookup is compound: a comment id that exists on a different task is
/// 404 here.
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<CommentResponse>> {
    let task = resolve_task_for_comments(&state, task_id, auth.user_id).await?;

    let comment = Comment::find_by_id_and_task(&state.db, comment_id, task.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(Json(decorate_comment(&state, comment).await?))
}

/// Delete a comment
///
/// Only the comment's author may delete it; board owners and members see
/// 403. The compound lookup keeps cross-task ids a 404.
///
/// # Errors
///
/// - `404 Not Found`: task missing, comment missing, or comment on another task
/// - `403 Forbidden`: caller is not the author
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let task = resolve_task_for_comments(&state, task_id, auth.user_id).await?;

    let comment = Comment::find_by_id_and_task(&state.db, comment_id, task.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    if !policy::can_delete_comment(auth.user_id, &comment) {
        return Err(ApiError::Forbidden(
            "Only the comment author may delete a comment".to_string(),
        ));
    }

    Comment::delete_by_id_and_task(&state.db, comment.id, task.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_response_serialization() {
        let response = CommentResponse {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            author: "Jane Doe".to_string(),
            content: "Looks good".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("Jane Doe"));
        assert!(json.contains("Looks good"));
    }
}
