//! API endpoints.

use axum::Router;
use maru_common::{AppError, AppResult};
use maru_core::ImageInput;

use crate::middleware::AppState;

pub mod auth;
pub mod contents;
pub mod groups;
pub mod media;
pub mod users;

/// Build the versioned API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/v1/auth", auth::router())
        .nest("/v1/contents", contents::router())
        .nest("/v1/groups", groups::router())
        .nest("/v1/media", media::router())
        .nest("/v1/users", users::router())
}

/// Classify a JSON-borne image payload into an input shape.
///
/// Data URIs and http(s) URLs are accepted; empty strings mean "no image".
pub(crate) fn image_input_from_payload(payload: Option<String>) -> AppResult<Option<ImageInput>> {
    let Some(payload) = payload else {
        return Ok(None);
    };
    if payload.is_empty() {
        return Ok(None);
    }

    if payload.starts_with("data:") {
        return Ok(Some(ImageInput::Base64(payload)));
    }
    if payload.starts_with("http://") || payload.starts_with("https://") {
        return Ok(Some(ImageInput::Url(payload)));
    }

    Err(AppError::BadRequest(
        "Unsupported image payload; expected a data URI or URL".to_string(),
    ))
}
