//! API integration tests.
//!
//! These tests verify routing, authentication, and input validation at the
//! HTTP boundary, with mock databases behind the services.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use maru_api::{middleware::AppState, router as api_router};
use maru_common::{LocalStorage, TokenCodec, config::KakaoConfig};
use maru_core::{
    AuthService, ContentService, GroupService, MediaService, ReactionService, TopicService,
    UserService,
};
use maru_db::repositories::{
    ContentRepository, GroupRepository, ReactionRepository, TopicRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a mock database connection.
fn create_mock_db() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

/// Create test app state with mock databases.
fn create_test_state() -> AppState {
    create_test_state_with(create_mock_db())
}

/// Create test app state over a prepared mock database.
fn create_test_state_with(db: Arc<DatabaseConnection>) -> AppState {

    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let topic_repo = TopicRepository::new(Arc::clone(&db));
    let content_repo = ContentRepository::new(Arc::clone(&db));
    let reaction_repo = ReactionRepository::new(Arc::clone(&db));

    let token_codec = TokenCodec::new("integration-test-secret", 3600);
    let kakao = KakaoConfig {
        client_id: "client-123".to_string(),
        client_secret: None,
        redirect_uri: "https://example.com/v1/auth/kakao/callback".to_string(),
    };

    let auth_service = AuthService::new(user_repo.clone(), token_codec, kakao);
    let group_service = GroupService::new(group_repo.clone());
    let user_service = UserService::new(user_repo.clone(), group_service.clone());
    let topic_service = TopicService::new(topic_repo.clone(), group_repo.clone());
    let content_service = ContentService::new(
        content_repo.clone(),
        topic_repo,
        group_repo,
        user_repo.clone(),
        reaction_repo.clone(),
    );
    let reaction_service = ReactionService::new(reaction_repo, content_repo, user_repo);

    let storage = Arc::new(LocalStorage::new(
        PathBuf::from("./test-files"),
        "/files".to_string(),
    ));
    let media_service = MediaService::new(storage, reqwest::Client::new());

    AppState {
        auth_service,
        user_service,
        group_service,
        topic_service,
        content_service,
        reaction_service,
        media_service,
        cookie_name: "AccessToken".to_string(),
        front_url: "http://localhost:3000".to_string(),
    }
}

/// Create the test router.
fn create_test_router() -> Router {
    let state = create_test_state();
    api_router().with_state(state)
}

/// Create a test router with the auth middleware over a prepared database.
fn create_authed_router(db: Arc<DatabaseConnection>) -> Router {
    let state = create_test_state_with(db);
    api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            maru_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

fn test_user(id: &str) -> maru_db::entities::user::Model {
    maru_db::entities::user::Model {
        id: id.to_string(),
        provider: "kakao".to_string(),
        provider_user_id: format!("kakao-{id}"),
        username: "tester".to_string(),
        email: None,
        avatar_url: None,
        role: "user".to_string(),
        created_at: chrono::Utc::now().into(),
    }
}

fn access_cookie(user_id: &str) -> String {
    let token = TokenCodec::new("integration-test-secret", 3600)
        .mint(user_id, "user")
        .unwrap();
    format!("AccessToken={token}")
}

#[tokio::test]
async fn test_my_without_cookie_is_unauthorized() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/users/my")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_daily_view_without_cookie_is_unauthorized() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/contents/g1/get?day=2024-06-10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_daily_view_rejects_malformed_date() {
    // The cookie names a live user; the date check fires before any
    // group lookup.
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1")]])
            .into_connection(),
    );
    let app = create_authed_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/contents/g1/get?day=2024/01/01")
                .header("Cookie", access_cookie("u1"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_monthly_view_rejects_malformed_month() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1")]])
            .into_connection(),
    );
    let app = create_authed_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/contents/get/month?groupId=g1&param=2024-13")
                .header("Cookie", access_cookie("u1"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_daily_view_without_membership_is_not_found() {
    // User lookup succeeds, membership lookup returns no row.
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("u1")]])
            .append_query_results([Vec::<maru_db::entities::group_member::Model>::new()])
            .into_connection(),
    );
    let app = create_authed_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/contents/g1/get?day=2024-06-10")
                .header("Cookie", access_cookie("u1"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reaction_rejects_unknown_kind() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/contents/reaction")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"contentId":"c1","userId":"u1","reaction":"meh"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/users/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_kakao_login_redirects_to_authorize_page() {
    let app = create_test_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/kakao")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(location.starts_with("https://kauth.kakao.com/oauth/authorize"));
}
