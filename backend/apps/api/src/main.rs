//! API Server Entry Point
//!
//! Uses `anyhow` for startup errors; request-level errors go through
//! `kernel::error::AppError`.

use std::sync::Arc;

use api::{Settings, bootstrap, build_app, cors_layer};
use auth::{MemoryAuthStore, PgAuthRepository};
use catalog::{MemoryCatalogStore, PgCatalogRepository};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;
    let auth_config = Arc::new(settings.auth.clone());

    let app = match &settings.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let auth_repo = Arc::new(PgAuthRepository::new(pool.clone()));
            bootstrap(auth_repo.clone(), auth_config.clone()).await?;

            build_app(
                auth_repo,
                Arc::new(PgCatalogRepository::new(pool)),
                auth_config,
                settings.catalog,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-process store; data is lost on exit");

            let auth_store = MemoryAuthStore::new();
            let catalog_store = MemoryCatalogStore::new(auth_store.clone());
            let auth_repo = Arc::new(auth_store);
            bootstrap(auth_repo.clone(), auth_config.clone()).await?;

            build_app(
                auth_repo,
                Arc::new(catalog_store),
                auth_config,
                settings.catalog,
            )
        }
    };

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(settings.frontend_origins.clone()));

    // Start server
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("Listening on {}", settings.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
