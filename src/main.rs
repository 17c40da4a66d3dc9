//! club-gateway server entry point.
//!
//! Starts the Axum HTTP server over the configured storage backend.

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use club_gateway::api;
use club_gateway::app_state::AppState;
use club_gateway::config::{ClubConfig, StorageBackend};
use club_gateway::storage::{AnyStorage, MemoryStorage, SqliteStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ClubConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting club-gateway");

    // Select and initialize the storage backend
    let store = match config.storage_backend {
        StorageBackend::Sqlite => {
            let sqlite =
                SqliteStorage::connect(&config.database_url, config.database_max_connections)
                    .await?;
            tracing::info!(url = %config.database_url, "sqlite storage ready");
            AnyStorage::Sqlite(sqlite)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage, data is lost on restart");
            AnyStorage::Memory(MemoryStorage::new())
        }
    };

    // Build application state and router
    let app_state = AppState::new(store);
    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
