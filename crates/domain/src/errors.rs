//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for OrderBridge
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum OrderBridgeError {
    /// Malformed or incomplete input, rejected before any persistence.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Actor is not entitled to perform the operation. Nothing is persisted.
    #[error("Access denied: {0}")]
    Authorization(String),

    /// The outbox (or another durable store) write itself failed. Surfaced
    /// distinctly because no audit record exists for the attempt.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Transient gateway failure (network, timeout, 5xx). Retryable.
    #[error("Gateway unavailable: {0}")]
    GatewayTransient(String),

    /// Definite business-rule rejection from the ERP. Not retryable without
    /// a payload change.
    #[error("Gateway rejected request: {0}")]
    GatewayRejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for OrderBridge operations
pub type Result<T> = std::result::Result<T, OrderBridgeError>;

impl OrderBridgeError {
    /// Stable label for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Authorization(_) => "authorization",
            Self::Persistence(_) => "persistence",
            Self::GatewayTransient(_) => "gateway_transient",
            Self::GatewayRejected(_) => "gateway_rejected",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}
