//! # OrderBridge Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The submission orchestration services
//!
//! ## Architecture Principles
//! - Only depends on `orderbridge-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod offline;
pub mod submission;

// Re-export specific items to avoid ambiguity
pub use offline::ports::OfflineQueue;
pub use submission::ports::{AccessGate, ErpGateway, LeadRepository, SubmissionOutbox};
pub use submission::service::{SubmissionOutcome, SubmissionRequest, SubmissionService};
pub use submission::side_effects::{SideEffect, SideEffectDispatcher};
