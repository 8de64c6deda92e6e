use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use contactbook_api::app::app;
use contactbook_api::config::config;
use contactbook_api::database::DatabaseManager;
use contactbook_api::services::{AvatarStorage, ContactService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, CONTACTBOOK_PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("contactbook_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    tracing::info!("Starting Contactbook API in {:?} mode", config.environment);

    let store = DatabaseManager::open_store(&config.database)
        .await
        .context("failed to open contact store")?;

    let storage = Arc::new(AvatarStorage::from_config(&config.upload));
    storage
        .ensure_dir()
        .await
        .with_context(|| format!("failed to create upload directory {}", storage.dir().display()))?;

    let service = Arc::new(ContactService::new(store, config.pagination.clone()));
    let app = app(service, storage, config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!(backend = ?config.database.backend, "Contactbook API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
