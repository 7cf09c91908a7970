/// User profile endpoints
///
/// Pure passthrough CRUD for the optional bio/location data attached to an
/// account. A user may read any profile but only update their own.
///
/// # Endpoints
///
/// - `GET /api/profiles/:user_id` - Fetch a profile (empty defaults if unset)
/// - `PATCH /api/profiles/:user_id` - Update own profile

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::{
        profile::{UpdateProfile, UserProfile},
        user::User,
    },
};
use uuid::Uuid;

/// Profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Profile patch body; omitted fields stay untouched
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Fetch a user's profile
///
/// A user without a stored profile row reads as an empty profile rather
/// than 404; the account itself must exist.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let profile = UserProfile::find_by_user(&state.db, user.id).await?;

    Ok(Json(match profile {
        Some(p) => ProfileResponse {
            user_id: p.user_id,
            bio: p.bio,
            location: p.location,
        },
        None => ProfileResponse {
            user_id: user.id,
            bio: None,
            location: None,
        },
    }))
}

/// Update the caller's own profile
///
/// # Errors
///
/// - `403 Forbidden`: attempting to update another user's profile
/// - `404 Not Found`: the account does not exist
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    if User::find_by_id(&state.db, user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    if auth.user_id != user_id {
        return Err(ApiError::Forbidden(
            "Cannot update another user's profile".to_string(),
        ));
    }

    let profile = UserProfile::upsert(
        &state.db,
        user_id,
        UpdateProfile {
            bio: req.bio,
            location: req.location,
        },
    )
    .await?;

    Ok(Json(ProfileResponse {
        user_id: profile.user_id,
        bio: profile.bio,
        location: profile.location,
    }))
}
