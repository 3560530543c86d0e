//! Maru server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use maru_api::{AppState, router as api_router};
use maru_common::{Config, LocalStorage, TokenCodec};
use maru_core::{
    AuthService, ContentService, GroupService, MediaService, ReactionService, TopicService,
    UserService,
};
use maru_db::repositories::{
    ContentRepository, GroupRepository, ReactionRepository, TopicRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maru=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting maru server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = maru_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    maru_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let topic_repo = TopicRepository::new(Arc::clone(&db));
    let content_repo = ContentRepository::new(Arc::clone(&db));
    let reaction_repo = ReactionRepository::new(Arc::clone(&db));

    // Initialize storage backend
    let storage = Arc::new(LocalStorage::new(
        PathBuf::from(&config.storage.base_path),
        config.storage.base_url.clone(),
    ));

    // Outbound HTTP client, shared by media downloads
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    // Initialize services
    let token_codec = TokenCodec::new(&config.auth.token_secret, config.auth.token_ttl_secs);
    let auth_service = AuthService::new(
        user_repo.clone(),
        token_codec,
        config.auth.kakao.clone(),
    );
    let group_service = GroupService::new(group_repo.clone());
    let user_service = UserService::new(user_repo.clone(), group_service.clone());
    let topic_service = TopicService::new(topic_repo.clone(), group_repo.clone());
    let content_service = ContentService::new(
        content_repo,
        topic_repo,
        group_repo,
        user_repo.clone(),
        reaction_repo.clone(),
    );
    let reaction_service = ReactionService::new(
        reaction_repo,
        ContentRepository::new(Arc::clone(&db)),
        user_repo,
    );
    let media_service = MediaService::new(storage, http);

    // Create app state
    let state = AppState {
        auth_service,
        user_service,
        group_service,
        topic_service,
        content_service,
        reaction_service,
        media_service,
        cookie_name: config.auth.cookie_name.clone(),
        front_url: config.server.front_url.clone(),
    };

    // Build router
    let app = Router::new()
        .merge(api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            maru_api::middleware::auth_middleware,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
