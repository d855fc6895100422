//! Local offline queue entry types
//!
//! Orders captured while the device is disconnected wait here until the sync
//! worker replays them through the submission pipeline. The queue carries an
//! explicit state machine and a monotonic per-device sequence number so a
//! crash mid-sync is recoverable without ambiguity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::order::OrderPayload;

/// Offline queue entry lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfflineOrderState {
    /// Waiting for the next sync cycle
    Queued,
    /// Picked up by a sync cycle; stale entries here indicate a crash
    Syncing,
    /// Replayed successfully; terminal
    Synced,
    /// Retries exhausted; parked for operator attention
    Failed,
}

impl fmt::Display for OfflineOrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = match self {
            Self::Queued => "queued",
            Self::Syncing => "syncing",
            Self::Synced => "synced",
            Self::Failed => "failed",
        };
        write!(f, "{raw}")
    }
}

impl FromStr for OfflineOrderState {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "queued" => Ok(Self::Queued),
            "syncing" => Ok(Self::Syncing),
            "synced" => Ok(Self::Synced),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown offline order state: {other}")),
        }
    }
}

/// Input for enqueueing an order captured offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOfflineOrder {
    /// Tenant scope
    pub company_id: i64,
    /// The captured order
    pub payload: OrderPayload,
    /// Actor identity for audit
    pub created_by: i64,
    /// Actor display name for audit
    pub created_by_name: String,
}

/// A durable offline queue entry, owned exclusively by its device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOfflineOrder {
    /// Local auto-increment id, device-scoped
    pub id: i64,
    /// Monotonic sequence within the owning device; drain order
    pub seq: i64,
    /// Owning device
    pub device_id: String,
    /// Tenant scope
    pub company_id: i64,
    /// The captured order, same shape as the outbox payload
    pub payload: OrderPayload,
    /// Current lifecycle state
    pub state: OfflineOrderState,
    /// Outbox record bound on the first attempt; later cycles retry it
    /// instead of creating a second record
    pub submission_id: Option<String>,
    /// Sync attempts made so far
    pub attempts: u32,
    /// Most recent sync failure detail
    pub last_error: Option<String>,
    /// Earliest time the next attempt may run
    pub next_attempt_at: Option<DateTime<Utc>>,
    /// Actor identity for audit
    pub created_by: i64,
    /// Actor display name for audit
    pub created_by_name: String,
    /// Capture time; drain order tie-breaker
    pub created_at: DateTime<Utc>,
}
