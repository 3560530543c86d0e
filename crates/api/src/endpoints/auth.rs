//! OAuth2 login endpoints.

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use maru_common::AppResult;
use serde::Deserialize;

use crate::middleware::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

/// Redirect the browser to the Kakao authorize page.
async fn kakao_login(State(state): State<AppState>) -> AppResult<Redirect> {
    let url = state.auth_service.authorize_url()?;
    Ok(Redirect::temporary(&url))
}

/// Complete the login: exchange the code, mint the access token, set the
/// cookie, and send the browser back to the front-end.
async fn kakao_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Response> {
    let (user, token) = state.auth_service.login_with_code(&query.code).await?;
    tracing::debug!(user_id = %user.id, "Setting access-token cookie");

    let cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        state.cookie_name,
        token,
        state.auth_service.token_ttl_secs(),
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Redirect::temporary(&state.front_url),
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/kakao", get(kakao_login))
        .route("/kakao/callback", get(kakao_callback))
}
