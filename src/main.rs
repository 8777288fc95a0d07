//! Storefront server binary.
//!
//! Loads configuration from the environment (and `.env`), applies the
//! embedded migrations, and serves the full HTTP surface until Ctrl+C.

use anyhow::Context;
use storefront::{db, router, AppState, Config, MIGRATOR};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(database = %config.database.url, "Configuration loaded");

    let pool = db::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    MIGRATOR
        .run(&pool)
        .await
        .context("failed to apply migrations")?;
    tracing::info!("Migrations applied");

    let state = AppState::new(pool, &config.auth);
    let app = router::build(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Storefront server is running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install Ctrl+C handler");
    }
}
