//! Content endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use maru_common::{AppError, AppResult};
use maru_core::{
    ReactionOutcome,
    content::{ContentDto, ContentEditView, MonthlyEntry, TopicDto},
    reaction::ReactionStats,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

use super::image_input_from_payload;

/// Create content request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    pub group_id: String,
    pub topic_id: String,
    #[validate(length(min = 1, max = 2048))]
    pub content_text: String,
    /// Base64 data URI or source URL, optional.
    pub images: Option<String>,
}

/// Update content request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    #[validate(length(min = 1, max = 2048))]
    pub content_text: String,
    pub images: Option<String>,
}

/// Submit reaction request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRequest {
    pub content_id: String,
    pub user_id: String,
    pub reaction: String,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub day: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthQuery {
    pub group_id: String,
    /// Year-month, YYYY-MM.
    pub param: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicQuery {
    pub group_id: String,
    pub day: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionQuery {
    pub content_id: String,
}

/// A day's topic with its posts and pagination flags.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyViewResponse {
    pub topic: TopicDto,
    pub contents: Vec<ContentDto>,
    pub has_prev_day: bool,
    pub has_next_day: bool,
}

/// A day's topic with pagination flags, without posts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicOnlyResponse {
    pub topic: TopicDto,
    pub has_prev_day: bool,
    pub has_next_day: bool,
}

/// Get a single post with its reaction counts.
async fn detail(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> AppResult<Json<ContentDto>> {
    Ok(Json(state.content_service.detail(&content_id).await?))
}

/// Create a post for a topic.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateContentRequest>,
) -> AppResult<ApiResponse<()>> {
    req.validate()?;

    let image = image_input_from_payload(req.images)?;
    let img_path = state.media_service.upload(image).await?;

    state
        .content_service
        .create(
            &user.id,
            &req.group_id,
            &req.topic_id,
            req.content_text,
            img_path,
        )
        .await?;

    Ok(ApiResponse::message("Content created."))
}

/// Update a post.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((group_id, content_id)): Path<(String, String)>,
    Json(req): Json<UpdateContentRequest>,
) -> AppResult<ApiResponse<()>> {
    req.validate()?;

    let image = image_input_from_payload(req.images)?;
    let img_path = state.media_service.upload(image).await?;

    state
        .content_service
        .update(&user.id, &group_id, &content_id, req.content_text, img_path)
        .await?;

    Ok(ApiResponse::message("Content updated."))
}

/// The editable fields of a post, for pre-filling an edit form.
async fn modify(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> AppResult<ApiResponse<ContentEditView>> {
    let view = state.content_service.edit_view(&content_id).await?;
    Ok(ApiResponse::ok("Content fields for editing.", view))
}

/// Delete a post. Reactions cascade; the stored image is cleaned up
/// best-effort.
async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((group_id, content_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<()>> {
    let deleted = state
        .content_service
        .delete(&user.id, &group_id, &content_id)
        .await?;

    if let Some(img) = deleted.img_path
        && !img.is_empty()
        && let Err(e) = state.media_service.remove_by_url(&img).await
    {
        tracing::warn!(error = %e, content_id = %content_id, "Failed to delete stored image");
    }

    Ok(ApiResponse::message("Content deleted."))
}

/// A day's topic and all posts for it.
async fn daily(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<DayQuery>,
) -> AppResult<ApiResponse<DailyViewResponse>> {
    let day = parse_day(&query.day)?;
    state.group_service.require_membership(&user.id, &group_id).await?;

    let topic_day = state.topic_service.topic_of_the_day(&group_id, day).await?;
    let contents = state
        .content_service
        .contents_for_topic(&topic_day.topic.id)
        .await?;

    Ok(ApiResponse::ok(
        "Contents retrieved.",
        DailyViewResponse {
            topic: topic_day.topic.into(),
            contents,
            has_prev_day: topic_day.has_prev_day,
            has_next_day: topic_day.has_next_day,
        },
    ))
}

/// One representative post per day of a month.
async fn monthly(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> AppResult<ApiResponse<Vec<MonthlyEntry>>> {
    let (year, month) = parse_month(&query.param)?;
    state
        .group_service
        .require_membership(&user.id, &query.group_id)
        .await?;

    let entries = state
        .content_service
        .monthly(&query.group_id, year, month)
        .await?;

    Ok(ApiResponse::ok("Contents retrieved.", entries))
}

/// A day's topic without its posts.
async fn topic(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TopicQuery>,
) -> AppResult<ApiResponse<TopicOnlyResponse>> {
    let day = parse_day(&query.day)?;
    state
        .group_service
        .require_membership(&user.id, &query.group_id)
        .await?;

    let topic_day = state
        .topic_service
        .topic_of_the_day(&query.group_id, day)
        .await?;

    Ok(ApiResponse::ok(
        "Topic retrieved.",
        TopicOnlyResponse {
            topic: topic_day.topic.into(),
            has_prev_day: topic_day.has_prev_day,
            has_next_day: topic_day.has_next_day,
        },
    ))
}

/// Submit a reaction: add, toggle off, or replace.
async fn submit_reaction(
    State(state): State<AppState>,
    Json(req): Json<ReactionRequest>,
) -> AppResult<ApiResponse<()>> {
    let outcome = state
        .reaction_service
        .submit(&req.content_id, &req.user_id, &req.reaction)
        .await?;

    let message = match outcome {
        ReactionOutcome::Added(_) => "Reaction added.",
        ReactionOutcome::Removed => "Reaction removed.",
    };
    Ok(ApiResponse::message(message))
}

/// Per-kind reaction counts, plus the caller's own reaction when known.
async fn reaction_stats(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReactionQuery>,
) -> AppResult<ApiResponse<ReactionStats>> {
    let caller_id = caller.as_ref().map(|u| u.id.as_str());
    let stats = state
        .reaction_service
        .stats(&query.content_id, caller_id)
        .await?;

    Ok(ApiResponse::ok("Reactions retrieved.", stats))
}

/// Parse a strict YYYY-MM-DD day parameter.
fn parse_day(day: &str) -> AppResult<NaiveDate> {
    let shape_ok = day.len() == 10
        && day.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(AppError::BadRequest(format!("Invalid date format: {day}")));
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date format: {day}")))
}

/// Parse a strict YYYY-MM month parameter.
fn parse_month(param: &str) -> AppResult<(i32, u32)> {
    let shape_ok = param.len() == 7
        && param.bytes().enumerate().all(|(i, b)| match i {
            4 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(AppError::BadRequest(format!(
            "Invalid month format: {param}"
        )));
    }

    let year = param[..4]
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid month format: {param}")))?;
    let month: u32 = param[5..]
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid month format: {param}")))?;
    if !(1..=12).contains(&month) {
        return Err(AppError::BadRequest(format!(
            "Invalid month format: {param}"
        )));
    }

    Ok((year, month))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/detail/{content_id}", get(detail))
        .route("/create", post(create))
        .route("/modify/{content_id}", get(modify))
        .route("/{group_id}/{content_id}", put(update))
        .route("/delete/{group_id}/{content_id}", delete(remove))
        .route("/{group_id}/get", get(daily))
        .route("/get/month", get(monthly))
        .route("/topic", get(topic))
        .route("/reaction", post(submit_reaction).get(reaction_stats))
}
