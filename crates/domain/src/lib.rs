//! # OrderBridge Domain
//!
//! Business domain types and models for OrderBridge.
//!
//! This crate contains:
//! - Domain data types (orders, submission records, offline queue entries)
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other OrderBridge crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::{Config, DatabaseConfig, ErpConfig, ServerConfig, SyncConfig};
pub use errors::{OrderBridgeError, Result};
pub use types::access::{UserAccess, Visibility};
pub use types::gateway::{GatewayError, GatewayErrorCategory};
pub use types::offline::{NewOfflineOrder, OfflineOrderState, PendingOfflineOrder};
pub use types::order::{LeadStatus, OrderItem, OrderPayload};
pub use types::submission::{
    FailureCode, SubmissionFailure, SubmissionFilter, SubmissionOrigin, SubmissionRecord,
    SubmissionStatus, SubmissionSummary,
};
