//! Submission outbox record types
//!
//! A `SubmissionRecord` is the durable write-ahead entry created before any
//! ERP call. Records are written already marked failed (pessimistic-first),
//! so a crash between the outbox write and the gateway call leaves an
//! auditable, visibly-failed record rather than a silently lost one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::order::OrderPayload;

/// How a submission was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionOrigin {
    /// Quick entry, not linked to a lead
    Quick,
    /// Lead-linked entry, carries a lead reference
    Lead,
    /// Replayed from the device-local offline queue
    Offline,
}

impl fmt::Display for SubmissionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = match self {
            Self::Quick => "quick",
            Self::Lead => "lead",
            Self::Offline => "offline",
        };
        write!(f, "{raw}")
    }
}

impl FromStr for SubmissionOrigin {
    type Err = String;

    // Case-insensitive: storage holds lowercase tokens, but records
    // serialize the uppercase form, and clients echo whichever they saw.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "lead" => Ok(Self::Lead),
            "offline" => Ok(Self::Offline),
            _ => Err(format!("unknown submission origin: {raw}")),
        }
    }
}

/// Submission record state machine.
///
/// `Failed` covers both the initial pessimistic state and a settled failed
/// attempt; the only forward transition is to `Succeeded`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Failed,
    Succeeded,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = match self {
            Self::Failed => "failed",
            Self::Succeeded => "succeeded",
        };
        write!(f, "{raw}")
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "failed" => Ok(Self::Failed),
            "succeeded" => Ok(Self::Succeeded),
            _ => Err(format!("unknown submission status: {raw}")),
        }
    }
}

/// Classification of a stored failure, so an operator reviewing failed
/// submissions can tell "try again" from "fix the data first".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCode {
    /// Payload rejected before any gateway call
    Validation,
    /// Outbox write bookkeeping failed after the record existed
    Persistence,
    /// Connectivity or timeout failure; retryable as-is
    GatewayTransient,
    /// Definite ERP business-rule rejection; needs a payload change
    GatewayRejected,
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = match self {
            Self::Validation => "Validation",
            Self::Persistence => "Persistence",
            Self::GatewayTransient => "GatewayTransient",
            Self::GatewayRejected => "GatewayRejected",
        };
        write!(f, "{raw}")
    }
}

impl FromStr for FailureCode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "Validation" => Ok(Self::Validation),
            "Persistence" => Ok(Self::Persistence),
            "GatewayTransient" => Ok(Self::GatewayTransient),
            "GatewayRejected" => Ok(Self::GatewayRejected),
            other => Err(format!("unknown failure code: {other}")),
        }
    }
}

/// Structured failure detail stored on a submission record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFailure {
    /// Retryability classification
    pub code: FailureCode,
    /// Human-readable detail
    pub message: String,
    /// When the failing attempt settled
    pub occurred_at: DateTime<Utc>,
}

impl SubmissionFailure {
    /// Build a failure stamped with the current time.
    pub fn now(code: FailureCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), occurred_at: Utc::now() }
    }

    /// Whether a retry without a payload change can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.code, FailureCode::GatewayTransient | FailureCode::Persistence)
    }
}

/// One durable outbox entry per logical submission attempt-sequence.
///
/// The payload never changes after creation; retries update status, error,
/// `attempt_count` and `last_attempt_at` in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// Opaque identifier, assigned at write time
    pub id: String,
    /// Tenant scope
    pub company_id: i64,
    /// How the submission was initiated
    pub origin: SubmissionOrigin,
    /// Originating lead, present iff origin is `Lead`
    pub lead_ref: Option<i64>,
    /// Verbatim order payload, for audit and replay
    pub payload: OrderPayload,
    /// Client-generated key the gateway de-duplicates on
    pub idempotency_key: String,
    /// Current state
    pub status: SubmissionStatus,
    /// ERP-assigned order number, set iff succeeded
    pub order_ref: Option<i64>,
    /// Most recent attempt failure, cleared on success
    pub error: Option<SubmissionFailure>,
    /// Attempts made so far, at least 1 once the record exists
    pub attempt_count: u32,
    /// Actor identity for audit
    pub created_by: i64,
    /// Actor display name for audit
    pub created_by_name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the most recent attempt
    pub last_attempt_at: DateTime<Utc>,
}

/// Operator read-path filter for the submissions listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    /// Restrict to one origin
    pub origin: Option<SubmissionOrigin>,
    /// Restrict to one status
    pub status: Option<SubmissionStatus>,
    /// Restrict to one lead
    pub lead_ref: Option<i64>,
}

/// Aggregate counters for the submission outbox.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    /// Records whose latest attempt failed
    pub failed_count: u32,
    /// Records settled successfully
    pub succeeded_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_round_trips() {
        for origin in [SubmissionOrigin::Quick, SubmissionOrigin::Lead, SubmissionOrigin::Offline] {
            assert_eq!(origin.to_string().parse::<SubmissionOrigin>(), Ok(origin));
        }
        assert!("rapido".parse::<SubmissionOrigin>().is_err());
    }

    #[test]
    fn status_round_trips() {
        for status in [SubmissionStatus::Failed, SubmissionStatus::Succeeded] {
            assert_eq!(status.to_string().parse::<SubmissionStatus>(), Ok(status));
        }
        assert!("pending".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn parsing_accepts_serialized_casing() {
        // Records go out SCREAMING_SNAKE_CASE; a client that echoes a
        // value it read back as a filter must not get rejected.
        assert_eq!("QUICK".parse::<SubmissionOrigin>(), Ok(SubmissionOrigin::Quick));
        assert_eq!("OFFLINE".parse::<SubmissionOrigin>(), Ok(SubmissionOrigin::Offline));
        assert_eq!("FAILED".parse::<SubmissionStatus>(), Ok(SubmissionStatus::Failed));
        assert_eq!("SUCCEEDED".parse::<SubmissionStatus>(), Ok(SubmissionStatus::Succeeded));
    }

    #[test]
    fn transient_failures_are_retryable() {
        let transient = SubmissionFailure::now(FailureCode::GatewayTransient, "timeout");
        let rejected = SubmissionFailure::now(FailureCode::GatewayRejected, "bad partner");
        assert!(transient.is_retryable());
        assert!(!rejected.is_retryable());
    }
}
