//! Application configuration structures
//!
//! Populated by the loader in `orderbridge-infra` from environment variables
//! or a TOML file.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Local SQLite database settings
    pub database: DatabaseConfig,
    /// ERP gateway settings
    pub erp: ErpConfig,
    /// Offline sync worker settings
    pub sync: SyncConfig,
    /// HTTP server settings
    pub server: ServerConfig,
}

/// SQLite database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the database file
    pub path: String,
    /// Connection pool size
    pub pool_size: u32,
}

/// ERP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErpConfig {
    /// Base URL of the ERP order API
    pub base_url: String,
    /// Optional bearer token for the ERP API
    pub api_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Offline sync worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Whether the background worker runs at all
    pub enabled: bool,
    /// Seconds between queue polls
    pub poll_interval_seconds: u64,
    /// Maximum entries drained per tick
    pub batch_size: usize,
    /// Attempts before an entry parks in the failed state
    pub max_retries: u32,
    /// Stable identifier of this device's offline queue
    pub device_id: String,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:8080`
    pub bind_addr: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_seconds: 60,
            batch_size: 50,
            max_retries: 8,
            device_id: "default".to_string(),
        }
    }
}
