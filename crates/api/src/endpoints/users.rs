//! User endpoints.

use axum::{
    Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use maru_common::AppResult;
use maru_core::user::UserProfile;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Profile of the authenticated caller.
async fn my(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state.user_service.profile(&user.id).await?;
    Ok(ApiResponse::ok("User retrieved.", profile))
}

/// Log out by expiring the access-token cookie.
async fn logout(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, expired_cookie(&state.cookie_name))],
        ApiResponse::message("Logged out."),
    )
        .into_response()
}

/// Delete the caller's account and expire the cookie.
async fn delete_account(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    state.user_service.delete_account(&user.id).await?;

    Ok((
        [(header::SET_COOKIE, expired_cookie(&state.cookie_name))],
        ApiResponse::message("Account deleted."),
    )
        .into_response())
}

/// A Set-Cookie value with zero max-age, clearing the token.
fn expired_cookie(cookie_name: &str) -> String {
    format!("{cookie_name}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax")
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/my", get(my))
        .route("/logout", get(logout))
        .route("/delete", delete(delete_account))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_cookie_zeroes_max_age() {
        let value = expired_cookie("AccessToken");
        assert!(value.starts_with("AccessToken=;"));
        assert!(value.contains("Max-Age=0"));
    }
}
