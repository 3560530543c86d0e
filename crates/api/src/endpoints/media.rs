//! Media upload endpoints.

use axum::{Router, extract::Multipart, extract::State, routing::post};
use maru_common::{AppError, AppResult};
use maru_core::ImageInput;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Uploaded image response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
}

/// Upload an image as multipart form data. Returns its public URL.
async fn upload(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
        .ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;

    let filename = field
        .file_name()
        .map(ToString::to_string)
        .ok_or_else(|| AppError::BadRequest("Missing filename".to_string()))?;
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

    let url = state
        .media_service
        .upload(Some(ImageInput::Multipart {
            filename,
            bytes: bytes.to_vec(),
        }))
        .await?
        .ok_or_else(|| AppError::BadRequest("Empty upload".to_string()))?;

    Ok(ApiResponse::ok("Image uploaded.", UploadResponse { url }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}
