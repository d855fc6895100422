//! SQLite storage utilities
//!
//! r2d2-based connection pooling with per-connection pragmas, shared by the
//! infrastructure repositories.

pub mod error;
pub mod pool;

pub use error::{StorageError, StorageResult};
pub use pool::{SqlitePool, SqlitePoolConfig};
