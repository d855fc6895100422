//! SQLite connection pool
//!
//! Provides r2d2-based connection pooling with per-connection pragmas:
//! WAL mode for concurrency, NORMAL synchronous mode, foreign keys on, and a
//! busy timeout for lock contention.

use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::{info, warn};

use super::error::{StorageError, StorageResult};

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct SqlitePoolConfig {
    /// Maximum pooled connections
    pub max_size: u32,
    /// How long `get` waits for a free connection
    pub connection_timeout: Duration,
    /// Busy timeout applied to every connection
    pub busy_timeout: Duration,
    /// Enable WAL journaling
    pub enable_wal: bool,
    /// Enforce foreign key constraints
    pub enable_foreign_keys: bool,
}

impl Default for SqlitePoolConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

/// Pooled SQLite handle used by the repositories.
#[derive(Debug)]
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
    config: SqlitePoolConfig,
}

impl SqlitePool {
    /// Create a pool over the database file at `path`, applying pragmas to
    /// every connection as it is opened.
    pub fn new(path: &Path, config: SqlitePoolConfig) -> StorageResult<Self> {
        let init_config = config.clone();
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            apply_connection_pragmas(conn, &init_config)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        });

        let pool = Pool::builder()
            .max_size(config.max_size.max(1))
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| {
                warn!(error = %e, "failed to create connection pool");
                StorageError::Connection(format!("failed to create pool: {e}"))
            })?;

        info!(db_path = %path.display(), max_connections = config.max_size, "sqlite pool initialised");

        Ok(Self { pool, config })
    }

    /// Acquire a connection, mapping pool exhaustion to a typed error.
    pub fn get(&self) -> StorageResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|_| StorageError::PoolExhausted)
    }

    /// Configured maximum pool size.
    pub fn max_size(&self) -> u32 {
        self.config.max_size
    }
}

fn apply_connection_pragmas(conn: &Connection, config: &SqlitePoolConfig) -> StorageResult<()> {
    let mut pragma_sql = String::new();

    if config.enable_wal {
        pragma_sql.push_str("PRAGMA journal_mode=WAL;\n");
        pragma_sql.push_str("PRAGMA wal_autocheckpoint=1000;\n");
    }

    pragma_sql.push_str("PRAGMA synchronous=NORMAL;\n");

    if config.enable_foreign_keys {
        pragma_sql.push_str("PRAGMA foreign_keys=ON;\n");
    }

    conn.execute_batch(&pragma_sql)
        .map_err(|e| StorageError::Query(format!("failed to apply pragmas: {e}")))?;

    conn.busy_timeout(config.busy_timeout)
        .map_err(|e| StorageError::Query(format!("failed to set busy timeout: {e}")))?;

    Ok(())
}
