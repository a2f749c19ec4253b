use anime_catalog::config::Config;
use anime_catalog::database::{create_pool, run_migrations};
use anime_catalog::services::comment_service::CommentService;
use anime_catalog::services::moderation_service::ModerationGate;
use anime_catalog::store::PgCommentStore;
use anime_catalog::{AppState, create_app};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anime_catalog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let db = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Run migrations
    run_migrations(&db).await?;
    tracing::info!("Database migrations completed");

    // Moderation gate
    let moderation = ModerationGate::from_config(&config)?;
    if moderation.is_enabled() {
        tracing::info!("Comment moderation enabled");
    } else {
        tracing::warn!("MODERATION_SERVICE_URL not set, comments are approved without moderation");
    }

    let comments = CommentService::new(Arc::new(PgCommentStore::new(db.clone())), moderation)
        .retain_rejected(config.retain_rejected_comments);

    // Create application state
    let state = AppState {
        db,
        comments,
        config: Arc::new(config.clone()),
    };

    // Create application
    let app = create_app(state);

    // Create listener
    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    tracing::info!("Server listening on {}:{}", config.host, config.port);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
