//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use maru_core::{
    AuthService, ContentService, GroupService, MediaService, ReactionService, TopicService,
    UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub group_service: GroupService,
    pub topic_service: TopicService,
    pub content_service: ContentService,
    pub reaction_service: ReactionService,
    pub media_service: MediaService,
    /// Name of the cookie carrying the access token.
    pub cookie_name: String,
    /// Front-end URL to redirect to after a completed login.
    pub front_url: String,
}

/// Authentication middleware.
///
/// Decodes the access-token cookie and, when it names a live user, attaches
/// the user model to the request. Handlers pick it up via the extractors;
/// identity is then passed explicitly into every service call.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());

    if let Some(cookie) = jar.get(&state.cookie_name)
        && let Ok(user_id) = state.auth_service.verify_token(cookie.value())
    {
        match state.user_service.get_by_id(&user_id).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, user_id = %user_id, "Token names an unknown user");
            }
        }
    }

    next.run(req).await
}
