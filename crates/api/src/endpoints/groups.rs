//! Group endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use maru_common::AppResult;
use maru_core::group::GroupSummary;
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

use super::image_input_from_payload;

/// Create group request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 128))]
    pub group_name: String,
    /// Base64 data URI or source URL, optional.
    pub images: Option<String>,
}

/// Create a group; the creator joins as an ACTIVE member.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> AppResult<ApiResponse<GroupSummary>> {
    req.validate()?;

    let image = image_input_from_payload(req.images)?;
    let photo_path = state.media_service.upload(image).await?;

    let group = state
        .group_service
        .create(&user.id, req.group_name, photo_path)
        .await?;

    Ok(ApiResponse::ok("Group created.", group.into()))
}

/// Groups the caller belongs to.
async fn my(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<GroupSummary>>> {
    let groups = state.group_service.my_groups(&user.id).await?;
    Ok(ApiResponse::ok("Groups retrieved.", groups))
}

/// Join a group.
async fn join(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.group_service.join(&user.id, &group_id).await?;
    Ok(ApiResponse::message("Joined the group."))
}

/// Leave a group. The membership row stays as NON_MEMBER.
async fn leave(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.group_service.leave(&user.id, &group_id).await?;
    Ok(ApiResponse::message("Left the group."))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/my", get(my))
        .route("/{group_id}/join", post(join))
        .route("/{group_id}/leave", post(leave))
}
