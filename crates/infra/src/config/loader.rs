//! Configuration loader
//!
//! Loads application configuration from environment variables or a TOML
//! file.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required variables are missing, falls back to a config file
//!
//! ## Environment Variables
//! - `ORDERBRIDGE_DB_PATH`: Database file path (required)
//! - `ORDERBRIDGE_DB_POOL_SIZE`: Connection pool size (default 10)
//! - `ORDERBRIDGE_ERP_BASE_URL`: Base URL of the ERP order API (required)
//! - `ORDERBRIDGE_ERP_API_TOKEN`: Bearer token for the ERP API (optional)
//! - `ORDERBRIDGE_ERP_TIMEOUT`: ERP request timeout in seconds (default 30)
//! - `ORDERBRIDGE_SYNC_ENABLED`: Whether the sync worker runs (default true)
//! - `ORDERBRIDGE_SYNC_INTERVAL`: Seconds between queue polls (default 60)
//! - `ORDERBRIDGE_SYNC_BATCH_SIZE`: Entries drained per tick (default 50)
//! - `ORDERBRIDGE_SYNC_MAX_RETRIES`: Attempts before parking (default 8)
//! - `ORDERBRIDGE_DEVICE_ID`: Stable offline queue identity (default "default")
//! - `ORDERBRIDGE_BIND_ADDR`: HTTP bind address (default 127.0.0.1:8080)
//!
//! ## File Locations
//! When the environment is incomplete the loader probes `./config.toml`,
//! `./orderbridge.toml` and the same names one directory up.

use std::path::{Path, PathBuf};

use orderbridge_domain::{
    Config, DatabaseConfig, ErpConfig, OrderBridgeError, Result, ServerConfig, SyncConfig,
};

/// Load configuration with automatic fallback strategy.
///
/// # Errors
/// Returns `OrderBridgeError::Config` when neither the environment nor a
/// config file yields a complete configuration.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables.
///
/// # Errors
/// Returns `OrderBridgeError::Config` if a required variable is missing or
/// a value fails to parse.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("ORDERBRIDGE_DB_PATH")?;
    let db_pool_size = env_parse("ORDERBRIDGE_DB_POOL_SIZE", 10_u32)?;

    let erp_base_url = env_var("ORDERBRIDGE_ERP_BASE_URL")?;
    let erp_api_token = std::env::var("ORDERBRIDGE_ERP_API_TOKEN").ok();
    let erp_timeout = env_parse("ORDERBRIDGE_ERP_TIMEOUT", 30_u64)?;

    let sync_defaults = SyncConfig::default();
    let sync = SyncConfig {
        enabled: env_bool("ORDERBRIDGE_SYNC_ENABLED", sync_defaults.enabled),
        poll_interval_seconds: env_parse(
            "ORDERBRIDGE_SYNC_INTERVAL",
            sync_defaults.poll_interval_seconds,
        )?,
        batch_size: env_parse("ORDERBRIDGE_SYNC_BATCH_SIZE", sync_defaults.batch_size)?,
        max_retries: env_parse("ORDERBRIDGE_SYNC_MAX_RETRIES", sync_defaults.max_retries)?,
        device_id: std::env::var("ORDERBRIDGE_DEVICE_ID").unwrap_or(sync_defaults.device_id),
    };

    let bind_addr =
        std::env::var("ORDERBRIDGE_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        erp: ErpConfig {
            base_url: erp_base_url,
            api_token: erp_api_token,
            timeout_seconds: erp_timeout,
        },
        sync,
        server: ServerConfig { bind_addr },
    })
}

/// Load configuration from a TOML file.
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `OrderBridgeError::Config` if no file is found or parsing fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(OrderBridgeError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            OrderBridgeError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| OrderBridgeError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| OrderBridgeError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| OrderBridgeError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(OrderBridgeError::Config(format!("Unsupported config format: {extension}"))),
    }
}

fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.toml"),
            cwd.join("orderbridge.toml"),
            cwd.join("../config.toml"),
            cwd.join("../orderbridge.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.toml"),
                exe_dir.join("orderbridge.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        OrderBridgeError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| OrderBridgeError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(contents: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn loads_complete_toml_file() {
        let file = write_config(
            r#"
            [database]
            path = "/tmp/orderbridge.db"
            pool_size = 5

            [erp]
            base_url = "http://erp.local"
            timeout_seconds = 15

            [sync]
            enabled = true
            poll_interval_seconds = 30
            batch_size = 20
            max_retries = 4
            device_id = "pda-01"

            [server]
            bind_addr = "127.0.0.1:9090"
            "#,
            ".toml",
        );

        let config = load_from_file(Some(file.path().to_path_buf())).expect("config");
        assert_eq!(config.database.path, "/tmp/orderbridge.db");
        assert_eq!(config.database.pool_size, 5);
        assert_eq!(config.erp.base_url, "http://erp.local");
        assert_eq!(config.erp.api_token, None);
        assert_eq!(config.sync.device_id, "pda-01");
        assert_eq!(config.server.bind_addr, "127.0.0.1:9090");
    }

    #[test]
    fn rejects_malformed_toml() {
        let file = write_config("not = [valid", ".toml");
        let err = load_from_file(Some(file.path().to_path_buf())).expect_err("must fail");
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn rejects_missing_file() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/config.toml")))
            .expect_err("must fail");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn loads_json_by_extension() {
        let file = write_config(
            r#"{
                "database": {"path": "/tmp/ob.db", "pool_size": 2},
                "erp": {"base_url": "http://erp.local", "api_token": "t0k", "timeout_seconds": 10},
                "sync": {"enabled": false, "poll_interval_seconds": 60, "batch_size": 50, "max_retries": 8, "device_id": "d"},
                "server": {"bind_addr": "0.0.0.0:8080"}
            }"#,
            ".json",
        );

        let config = load_from_file(Some(file.path().to_path_buf())).expect("config");
        assert!(!config.sync.enabled);
        assert_eq!(config.erp.api_token.as_deref(), Some("t0k"));
    }
}
