//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;

/// Which storage backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Durable SQLite database.
    Sqlite,
    /// In-process store, lost on restart.
    Memory,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`ClubConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ClubConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// SQLite connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Selected storage backend.
    pub storage_backend: StorageBackend,
}

impl ClubConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://club.db".to_string());

        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 10);

        let storage_backend = match std::env::var("STORAGE_BACKEND").ok().as_deref() {
            Some("memory") | Some("MEMORY") => StorageBackend::Memory,
            _ => StorageBackend::Sqlite,
        };

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections,
            storage_backend,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
