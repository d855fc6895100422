//! # OrderBridge Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories (submission outbox, offline queue, access, leads)
//! - The ERP HTTP gateway
//! - The offline reconciliation worker
//! - The configuration loader
//!
//! ## Architecture
//! - Implements traits defined in `orderbridge-core`
//! - Depends on `orderbridge-common` and `orderbridge-core`
//! - Contains all "impure" code (I/O, network)

pub mod config;
pub mod database;
pub mod erp;
pub mod http;
pub mod sync;

// Re-export commonly used items
pub use database::{
    DbManager, SqliteAccessRepository, SqliteLeadRepository, SqliteOfflineQueueRepository,
    SqliteSubmissionRepository,
};
pub use erp::ErpClient;
pub use http::HttpClient;
pub use sync::{OrderSubmitter, SyncWorker, SyncWorkerConfig};
