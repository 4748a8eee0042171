use anyhow::{Context, Result};
use dotenv::dotenv;
use std::net::SocketAddr;
use tokio::signal;

use parts_api::observability::Observability;
use parts_api::{build_router, db, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    let obs = Observability::init()?;
    let config = AppConfig::from_env()?;
    tracing::info!(
        environment = config.environment.as_str(),
        base_path = %config.base_path,
        "configuration loaded"
    );

    let pool = db::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!("Database connected and migrations applied");

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", config.upload_dir.display()))?;
    tracing::info!(upload_dir = %config.upload_dir.display(), "upload directory ready");

    let state = AppState::new(pool, obs.registry, config.upload_dir.clone());
    let app = build_router(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
