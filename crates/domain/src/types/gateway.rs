//! ERP gateway error classification
//!
//! The gateway must distinguish connectivity failures (retryable, transient)
//! from business-rule rejections (not retryable without a payload change).
//! That distinction is preserved up through `SubmissionRecord.error`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::submission::FailureCode;

/// Gateway error category for retry strategies and user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayErrorCategory {
    /// Network is offline or unreachable
    NetworkOffline,
    /// Network request timed out; the ERP may or may not have acted
    NetworkTimeout,
    /// ERP server unavailable (5xx)
    ServerUnavailable,
    /// Rate limit exceeded (429)
    RateLimited,
    /// Authentication failed (401, 403)
    Authentication,
    /// Invalid request or data (remaining 4xx)
    Validation,
    /// Unknown or unclassified error
    Unknown,
}

impl GatewayErrorCategory {
    /// Returns true if this error type should be retried without changes.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::NetworkOffline | Self::NetworkTimeout | Self::ServerUnavailable | Self::RateLimited
        )
    }

    /// Recommended retry delay in seconds, when a retry makes sense.
    pub fn retry_delay_secs(self) -> Option<u64> {
        match self {
            Self::NetworkOffline => Some(30),
            Self::NetworkTimeout => Some(10),
            Self::ServerUnavailable => Some(60),
            Self::RateLimited => Some(120),
            _ => None,
        }
    }

    /// User-friendly message for this category.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::NetworkOffline => {
                "No network connection. The order is queued locally and will sync automatically."
            }
            Self::NetworkTimeout => {
                "The ERP took too long to respond. Please try again in a few moments."
            }
            Self::ServerUnavailable => {
                "The ERP is temporarily unavailable. This is usually temporary - please try \
                 again in a minute."
            }
            Self::RateLimited => {
                "Too many requests. Please wait a couple minutes before trying again."
            }
            Self::Authentication => {
                "ERP authentication failed. Please check the configured credentials."
            }
            Self::Validation => {
                "The ERP rejected the order data. Please review partner and line items."
            }
            Self::Unknown => {
                "An unexpected error occurred. Please try again or contact support if the \
                 problem persists."
            }
        }
    }

    /// Map into the failure code stored on the submission record.
    pub fn failure_code(self) -> FailureCode {
        if self.is_retryable() {
            FailureCode::GatewayTransient
        } else {
            FailureCode::GatewayRejected
        }
    }
}

impl fmt::Display for GatewayErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = match self {
            Self::NetworkOffline => "Network Offline",
            Self::NetworkTimeout => "Network Timeout",
            Self::ServerUnavailable => "Server Unavailable",
            Self::RateLimited => "Rate Limited",
            Self::Authentication => "Authentication Failed",
            Self::Validation => "Validation Error",
            Self::Unknown => "Unknown Error",
        };
        write!(f, "{raw}")
    }
}

/// Structured gateway failure with retry metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    category: GatewayErrorCategory,
    message: String,
    context: Option<String>,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(category: GatewayErrorCategory, message: impl Into<String>) -> Self {
        Self { category, message: message.into(), context: None }
    }

    /// Create an unknown error for unexpected failures.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCategory::Unknown, message)
    }

    /// Attach detail from the failing call.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Error category.
    pub fn category(&self) -> GatewayErrorCategory {
        self.category
    }

    /// Raw error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Optional call context.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Whether a retry without changes can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }

    /// User-facing message, with context appended when present.
    pub fn user_message(&self) -> String {
        let base = self.category.user_message();
        match &self.context {
            Some(ctx) => format!("{base} Details: {ctx}"),
            None => base.to_string(),
        }
    }

    /// Classify an HTTP status code into a gateway error.
    pub fn from_status(status: u16, reason: &str) -> Self {
        let category = match status {
            401 | 403 => GatewayErrorCategory::Authentication,
            429 => GatewayErrorCategory::RateLimited,
            400..=499 => GatewayErrorCategory::Validation,
            500..=599 => GatewayErrorCategory::ServerUnavailable,
            _ => GatewayErrorCategory::Unknown,
        };
        Self::new(category, format!("HTTP {status}: {reason}"))
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{}: {} ({})", self.category, self.message, ctx),
            None => write!(f, "{}: {}", self.category, self.message),
        }
    }
}

impl std::error::Error for GatewayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_categories_are_retryable() {
        assert!(GatewayErrorCategory::NetworkOffline.is_retryable());
        assert!(GatewayErrorCategory::NetworkTimeout.is_retryable());
        assert!(GatewayErrorCategory::ServerUnavailable.is_retryable());
        assert!(GatewayErrorCategory::RateLimited.is_retryable());
        assert!(!GatewayErrorCategory::Authentication.is_retryable());
        assert!(!GatewayErrorCategory::Validation.is_retryable());
    }

    #[test]
    fn status_classification() {
        assert_eq!(
            GatewayError::from_status(503, "Service Unavailable").category(),
            GatewayErrorCategory::ServerUnavailable
        );
        assert_eq!(
            GatewayError::from_status(422, "Unprocessable Entity").category(),
            GatewayErrorCategory::Validation
        );
        assert_eq!(
            GatewayError::from_status(401, "Unauthorized").category(),
            GatewayErrorCategory::Authentication
        );
        assert_eq!(
            GatewayError::from_status(429, "Too Many Requests").category(),
            GatewayErrorCategory::RateLimited
        );
    }

    #[test]
    fn failure_code_follows_retryability() {
        assert_eq!(
            GatewayErrorCategory::NetworkTimeout.failure_code(),
            FailureCode::GatewayTransient
        );
        assert_eq!(GatewayErrorCategory::Validation.failure_code(), FailureCode::GatewayRejected);
    }
}
