//! # OrderBridge Common
//!
//! Infrastructure-free shared utilities.
//!
//! This crate contains:
//! - Retry/backoff strategy used by the offline sync worker
//! - SQLite connection pool wrapper and storage error types
//!
//! ## Architecture
//! - No dependencies on other OrderBridge crates
//! - No domain knowledge; pure mechanism

pub mod retry;
pub mod storage;

pub use retry::RetryStrategy;
pub use storage::{SqlitePool, SqlitePoolConfig, StorageError};
