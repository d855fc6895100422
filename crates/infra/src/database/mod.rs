//! SQLite-backed implementations of the core ports.
//!
//! Every repository runs its statements on `tokio::task::spawn_blocking`
//! against a pooled connection; timestamps are stored as UTC epoch seconds.

mod access_repository;
mod lead_repository;
mod manager;
mod offline_queue_repository;
mod submission_repository;

pub use access_repository::SqliteAccessRepository;
pub use lead_repository::SqliteLeadRepository;
pub use manager::DbManager;
pub use offline_queue_repository::SqliteOfflineQueueRepository;
pub use submission_repository::SqliteSubmissionRepository;

use chrono::{DateTime, Utc};
use orderbridge_common::storage::StorageError;
use orderbridge_domain::OrderBridgeError;
use tokio::task;

pub(crate) fn map_storage_error(err: StorageError) -> OrderBridgeError {
    OrderBridgeError::Persistence(err.to_string())
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> OrderBridgeError {
    OrderBridgeError::Persistence(err.to_string())
}

pub(crate) fn map_join_error(err: task::JoinError) -> OrderBridgeError {
    if err.is_cancelled() {
        OrderBridgeError::Internal("database task cancelled".into())
    } else {
        OrderBridgeError::Internal(format!("database task panic: {err}"))
    }
}

pub(crate) fn to_epoch(ts: DateTime<Utc>) -> i64 {
    ts.timestamp()
}

pub(crate) fn from_epoch(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
