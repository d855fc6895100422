//! Port interface for the device-local offline queue

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orderbridge_domain::{NewOfflineOrder, PendingOfflineOrder, Result};

/// Durable client-side store of orders captured while disconnected.
///
/// Single-writer by contract: each queue belongs to exactly one device. The
/// worker drains entries oldest-sequence-first; there is no cross-device
/// ordering guarantee.
#[async_trait]
pub trait OfflineQueue: Send + Sync {
    /// Append a captured order, assigning the next per-device sequence
    /// number. Returns the local entry id.
    async fn enqueue(&self, order: &NewOfflineOrder) -> Result<i64>;

    /// Queued entries whose `next_attempt_at` has passed, oldest sequence
    /// first, bounded by `limit`.
    async fn due_batch(&self, limit: usize, now: DateTime<Utc>) -> Result<Vec<PendingOfflineOrder>>;

    /// Transition an entry to the syncing state before replaying it.
    async fn mark_syncing(&self, id: i64) -> Result<()>;

    /// Terminal success: the corresponding submission record succeeded.
    async fn mark_synced(&self, id: i64) -> Result<()>;

    /// Record a failed sync attempt. `next_attempt_at = None` parks the
    /// entry in the failed state; otherwise it returns to queued and waits.
    async fn mark_failed(
        &self,
        id: i64,
        error: &str,
        next_attempt_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Remember the outbox record created for this entry, so later cycles
    /// retry that record instead of creating a second one.
    async fn bind_submission(&self, id: i64, submission_id: &str) -> Result<()>;

    /// Crash recovery: return entries stuck in syncing since before
    /// `stale_before` to the queued state. Returns how many were requeued.
    async fn requeue_stuck(&self, stale_before: DateTime<Utc>) -> Result<u32>;

    /// Fetch a single entry.
    async fn get(&self, id: i64) -> Result<Option<PendingOfflineOrder>>;
}
