//! Scisync server entry point.

use std::sync::Arc;

use axum::{Router, middleware};
use scisync_api::{middleware::AppState, router as api_router};
use scisync_common::Config;
use scisync_core::{CommentService, ResearchService, UserService, VoteService};
use scisync_db::repositories::{
    CommentRepository, ResearchRepository, UserRepository, VoteRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
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
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scisync=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting scisync server...");

    // Load configuration
    let config = Config::load()?;

    if config.admin.secret.is_none() {
        warn!("No admin secret configured; moderation endpoints will refuse all requests");
    }

    // Connect to database
    let db = scisync_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    scisync_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let research_repo = ResearchRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo.clone());
    let research_service = ResearchService::new(research_repo.clone(), user_repo);
    let comment_service = CommentService::new(comment_repo.clone(), research_repo.clone());
    let vote_service = VoteService::new(
        Arc::clone(&db),
        vote_repo,
        research_repo,
        comment_repo,
        config.voting.clone(),
    );

    // Create app state
    let state = AppState {
        user_service,
        research_service,
        comment_service,
        vote_service,
        admin_secret: config.admin.secret.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            scisync_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = config.server.bind_addr();
    info!("Listening on {} (public URL {})", addr, config.server.url);

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
