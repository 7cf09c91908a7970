/// Board endpoints
///
/// Boards are visible to their owner and members only. List and detail
/// responses carry computed aggregates (member count, task counts) that are
/// derived from live state on every request; there is no cached counter
/// column to drift out of date.
///
/// # Endpoints
///
/// - `GET /api/boards` - Boards visible to the caller, decorated
/// - `POST /api/boards` - Create a board, requester becomes owner
/// - `GET /api/boards/:id` - Board detail with member objects and tasks
/// - `PATCH /api/boards/:id` - Update title and/or replace the member set
/// - `DELETE /api/boards/:id` - Delete the board and everything under it

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::tasks::{decorate_tasks, TaskResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{middleware::AuthContext, policy},
    models::{
        board::{Board, CreateBoard},
        task::Task,
        user::{User, UserSummary},
    },
};
use uuid::Uuid;

/// Decorated board for list/create responses
#[derive(Debug, Serialize)]
pub struct BoardSummaryResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub owner_id: Uuid,

    /// Number of members (owner not included)
    pub member_count: i64,

    /// All tasks on the board
    pub ticket_count: i64,

    /// Tasks with status `to-do`
    pub tasks_to_do_count: i64,

    /// Tasks with priority `high`
    pub tasks_high_prio_count: i64,
}

/// Board detail: full member objects plus the decorated task list
#[derive(Debug, Serialize)]
pub struct BoardDetailResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub owner_id: Uuid,
    pub members: Vec<UserSummary>,
    pub tasks: Vec<TaskResponse>,
}

/// Update response: full owner and member objects
#[derive(Debug, Serialize)]
pub struct BoardUpdateResponse {
    pub id: Uuid,
    pub title: Option<String>,
    pub owner_data: UserSummary,
    pub members_data: Vec<UserSummary>,
}

/// Create board request
#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    /// Optional title
    pub title: Option<String>,

    /// Initial member ids; every id must reference an existing user
    #[serde(default)]
    pub members: Vec<Uuid>,
}

/// Update board request
///
/// `title` and `members` are independently optional. An absent `members`
/// field leaves the member set untouched; a present one replaces it
/// wholesale (including `[]`, which clears it).
#[derive(Debug, Deserialize)]
pub struct UpdateBoardRequest {
    pub title: Option<String>,
    pub members: Option<Vec<Uuid>>,
}

/// Attaches the computed aggregates to a board
async fn decorate(state: &AppState, board: Board) -> ApiResult<BoardSummaryResponse> {
    let member_count = Board::member_count(&state.db, board.id).await?;
    let stats = Task::stats_for_board(&state.db, board.id).await?;

    Ok(BoardSummaryResponse {
        id: board.id,
        title: board.title,
        owner_id: board.owner_id,
        member_count,
        ticket_count: stats.ticket_count,
        tasks_to_do_count: stats.to_do_count,
        tasks_high_prio_count: stats.high_prio_count,
    })
}

/// Rejects member id lists containing unknown users
///
/// Validation runs before any write so a bad request never leaves a
/// half-updated member set behind.
async fn require_existing_users(state: &AppState, ids: &[Uuid]) -> ApiResult<()> {
    let existing = User::filter_existing(&state.db, ids).await?;

    if let Some(unknown) = ids.iter().find(|id| !existing.contains(id)) {
        return Err(ApiError::BadRequest(format!(
            "Unknown member id: {}",
            unknown
        )));
    }

    Ok(())
}

/// Loads the member summaries of a board
async fn member_summaries(state: &AppState, board_id: Uuid) -> ApiResult<Vec<UserSummary>> {
    let ids = Board::member_ids(&state.db, board_id).await?;
    let users = User::find_by_ids(&state.db, &ids).await?;

    Ok(users.iter().map(User::summary).collect())
}

/// List boards visible to the caller
///
/// A board appears iff the caller owns it or is a member; a caller who is
/// both sees it once.
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BoardSummaryResponse>>> {
    let boards = Board::list_visible(&state.db, auth.user_id).await?;

    let mut decorated = Vec::with_capacity(boards.len());
    for board in boards {
        decorated.push(decorate(&state, board).await?);
    }

    Ok(Json(decorated))
}

/// Create a board
///
/// The requester becomes the owner; the given member ids form the initial
/// member set.
///
/// # Errors
///
/// - `400 Bad Request`: a member id references no existing user
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<BoardSummaryResponse>)> {
    require_existing_users(&state, &req.members).await?;

    let board = Board::create(
        &state.db,
        CreateBoard {
            title: req.title,
            owner_id: auth.user_id,
            member_ids: req.members,
        },
    )
    .await?;

    tracing::info!(board_id = %board.id, owner_id = %auth.user_id, "Created board");

    let decorated = decorate(&state, board).await?;
    Ok((StatusCode::CREATED, Json(decorated)))
}

/// Board detail view
///
/// # Errors
///
/// - `404 Not Found`: no such board
/// - `403 Forbidden`: caller is neither owner nor member
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardDetailResponse>> {
    let board = Board::find_by_id(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    let member_ids = Board::member_ids(&state.db, board.id).await?;
    if !policy::can_view_board(auth.user_id, &board, &member_ids) {
        return Err(ApiError::Forbidden("Not a member of this board".to_string()));
    }

    let members = member_summaries(&state, board.id).await?;
    let tasks = Task::list_by_board(&state.db, board.id).await?;
    let tasks = decorate_tasks(&state, tasks).await?;

    Ok(Json(BoardDetailResponse {
        id: board.id,
        title: board.title,
        owner_id: board.owner_id,
        members,
        tasks,
    }))
}

/// Update a board's title and/or member set
///
/// Replace semantics apply only when `members` is present in the patch;
/// omitting it leaves the existing set untouched.
///
/// # Errors
///
/// - `404 Not Found` / `403 Forbidden`
/// - `400 Bad Request`: a member id references no existing user
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<BoardUpdateResponse>> {
    let board = Board::find_by_id(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    let member_ids = Board::member_ids(&state.db, board.id).await?;
    if !policy::can_mutate_board(auth.user_id, &board, &member_ids) {
        return Err(ApiError::Forbidden("Not a member of this board".to_string()));
    }

    if let Some(ref new_members) = req.members {
        require_existing_users(&state, new_members).await?;
        Board::set_members(&state.db, board.id, new_members).await?;
    }

    let board = match req.title {
        Some(title) => Board::update_title(&state.db, board.id, Some(title))
            .await?
            .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?,
        None => board,
    };

    let owner = User::find_by_id(&state.db, board.owner_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Board owner missing".to_string()))?;

    let members_data = member_summaries(&state, board.id).await?;

    Ok(Json(BoardUpdateResponse {
        id: board.id,
        title: board.title,
        owner_data: owner.summary(),
        members_data,
    }))
}

/// Delete a board
///
/// Cascades to the board's tasks and their comments in one transaction.
///
/// # Errors
///
/// - `404 Not Found` / `403 Forbidden`
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let board = Board::find_by_id(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    let member_ids = Board::member_ids(&state.db, board.id).await?;
    if !policy::can_mutate_board(auth.user_id, &board, &member_ids) {
        return Err(ApiError::Forbidden("Not a member of this board".to_string()));
    }

    Board::delete_cascade(&state.db, board.id).await?;

    tracing::info!(board_id = %board.id, user_id = %auth.user_id, "Deleted board");

    Ok(StatusCode::NO_CONTENT)
}
