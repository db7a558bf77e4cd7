//! Vaccine Inventory Management Platform - Backend Server
//!
//! Tracks vaccine lots from receipt through administration, loss and
//! physical count reconciliation.

use std::{net::SocketAddr, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vims_server::{
    config::{Config, StorageDriver},
    create_app,
    store::Stores,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vims_server=debug,tower_http=debug,sqlx=warn".into());
    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Vaccine Inventory Management Server");
    tracing::info!("Environment: {}", config.environment);

    let (stores, db) = match config.storage.driver {
        StorageDriver::Memory => {
            tracing::info!("Using in-memory record store");
            (Stores::in_memory(), None)
        }
        StorageDriver::Postgres => {
            // Create database connection pool
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.storage.max_connections)
                .min_connections(config.storage.min_connections)
                .acquire_timeout(Duration::from_secs(config.storage.acquire_timeout_secs))
                .connect(config.database_url()?)
                .await?;

            tracing::info!("Database connection established");

            if config.storage.run_migrations {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            (Stores::postgres(db_pool.clone()), Some(db_pool))
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::new(stores, config, db);

    // Warm the inventory snapshot; the first read retries if this fails
    if let Err(e) = state.loader.reload().await {
        tracing::warn!("Initial inventory load failed: {}", e);
    }

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
