//! Sync worker draining the offline queue back through the submission
//! pipeline.
//!
//! Polls for due queued entries and replays each one as a regular
//! submission. The first replay of an entry creates an outbox record and
//! binds its id to the entry; later cycles retry that bound record so the
//! outbox never grows a second row for the same captured order. Join handles
//! are tracked, cancellation is explicit, and batch processing runs under a
//! timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use orderbridge_common::RetryStrategy;
use orderbridge_core::{OfflineQueue, SubmissionOutcome, SubmissionRequest, SubmissionService};
use orderbridge_domain::{OrderBridgeError, PendingOfflineOrder, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Configuration for the sync worker.
#[derive(Debug, Clone)]
pub struct SyncWorkerConfig {
    /// Maximum number of entries to process per batch
    pub batch_size: usize,
    /// Interval between polling attempts
    pub poll_interval: Duration,
    /// Timeout for processing a single batch
    pub processing_timeout: Duration,
    /// Join timeout when stopping
    pub join_timeout: Duration,
    /// Entries stuck in syncing longer than this are returned to queued
    pub stale_syncing_after: Duration,
    /// Backoff schedule between replay attempts
    pub retry: RetryStrategy,
}

impl Default for SyncWorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            poll_interval: Duration::from_secs(30),
            processing_timeout: Duration::from_secs(300),
            join_timeout: Duration::from_secs(5),
            stale_syncing_after: Duration::from_secs(600),
            retry: RetryStrategy::new(),
        }
    }
}

/// Interface for replaying captured orders through the submission pipeline.
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// First replay: create and attempt a fresh offline-origin submission.
    async fn submit_offline(&self, request: SubmissionRequest) -> Result<SubmissionOutcome>;

    /// Later replays: re-attempt the submission bound to the entry.
    async fn retry_submission(
        &self,
        submission_id: &str,
        company_id: i64,
        actor_id: i64,
    ) -> Result<SubmissionOutcome>;
}

#[async_trait]
impl OrderSubmitter for SubmissionService {
    async fn submit_offline(&self, request: SubmissionRequest) -> Result<SubmissionOutcome> {
        SubmissionService::submit_offline(self, request).await
    }

    async fn retry_submission(
        &self,
        submission_id: &str,
        company_id: i64,
        actor_id: i64,
    ) -> Result<SubmissionOutcome> {
        self.retry(submission_id, company_id, actor_id).await
    }
}

/// Offline queue sync worker with explicit lifecycle management.
pub struct SyncWorker {
    queue: Arc<dyn OfflineQueue>,
    submitter: Arc<dyn OrderSubmitter>,
    config: SyncWorkerConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl SyncWorker {
    /// Create a new sync worker with the given configuration.
    pub fn new(
        queue: Arc<dyn OfflineQueue>,
        submitter: Arc<dyn OrderSubmitter>,
        config: SyncWorkerConfig,
    ) -> Self {
        Self { queue, submitter, config, cancellation: CancellationToken::new(), task_handle: None }
    }

    /// Start the worker, spawning the background processing task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(OrderBridgeError::Internal("sync worker already running".into()));
        }

        info!("Starting sync worker");

        self.cancellation = CancellationToken::new();

        let queue = Arc::clone(&self.queue);
        let submitter = Arc::clone(&self.submitter);
        let config = self.config.clone();
        let cancel = self.cancellation.clone();

        let handle = tokio::spawn(async move {
            Self::process_loop(queue, submitter, config, cancel).await;
        });

        self.task_handle = Some(handle);
        info!("Sync worker started");

        Ok(())
    }

    /// Stop the worker and wait for the processing task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<()> {
        if !self.is_running() {
            return Err(OrderBridgeError::Internal("sync worker not running".into()));
        }

        info!("Stopping sync worker");

        self.cancellation.cancel();

        if let Some(handle) = self.task_handle.take() {
            match tokio::time::timeout(self.config.join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Sync worker task panicked: {}", e);
                    return Err(OrderBridgeError::Internal("sync worker task panicked".into()));
                }
                Err(_) => {
                    warn!("Sync worker task did not complete within timeout");
                    return Err(OrderBridgeError::Internal("sync worker join timeout".into()));
                }
            }
        }

        info!("Sync worker stopped");
        self.cancellation = CancellationToken::new();

        Ok(())
    }

    /// Returns true when a worker instance is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Background processing loop.
    async fn process_loop(
        queue: Arc<dyn OfflineQueue>,
        submitter: Arc<dyn OrderSubmitter>,
        config: SyncWorkerConfig,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Sync worker process loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.poll_interval) => {
                    match tokio::time::timeout(
                        config.processing_timeout,
                        Self::process_batch(&queue, &submitter, &config),
                    )
                    .await
                    {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            error!(error = %e, "Batch processing failed");
                        }
                        Err(_) => {
                            warn!(
                                timeout_secs = config.processing_timeout.as_secs(),
                                "Batch processing timed out"
                            );
                        }
                    }
                }
            }
        }
    }

    /// Process a single batch of due queue entries.
    ///
    /// Per-entry failures never abort the batch; each entry settles its own
    /// state before the next one is considered.
    async fn process_batch(
        queue: &Arc<dyn OfflineQueue>,
        submitter: &Arc<dyn OrderSubmitter>,
        config: &SyncWorkerConfig,
    ) -> Result<()> {
        let now = Utc::now();

        let stale_before = now
            - chrono::Duration::from_std(config.stale_syncing_after)
                .unwrap_or_else(|_| chrono::Duration::seconds(600));
        let requeued = queue.requeue_stuck(stale_before).await?;
        if requeued > 0 {
            warn!(count = requeued, "Requeued entries stuck in syncing");
        }

        let entries = queue.due_batch(config.batch_size, now).await?;
        if entries.is_empty() {
            debug!("No due offline entries to process");
            return Ok(());
        }

        info!(count = entries.len(), "Processing offline sync batch");

        let mut synced = 0_u32;
        let mut failures = 0_u32;

        for entry in entries {
            match Self::process_entry(queue, submitter, config, &entry).await {
                Ok(true) => synced = synced.saturating_add(1),
                Ok(false) => failures = failures.saturating_add(1),
                Err(err) => {
                    warn!(entry_id = entry.id, error = %err, "Settling offline entry failed");
                    failures = failures.saturating_add(1);
                }
            }
        }

        debug!(synced = synced, failures = failures, "Offline sync batch completed");
        Ok(())
    }

    /// Replay one entry. Returns whether it reached the synced state.
    async fn process_entry(
        queue: &Arc<dyn OfflineQueue>,
        submitter: &Arc<dyn OrderSubmitter>,
        config: &SyncWorkerConfig,
        entry: &PendingOfflineOrder,
    ) -> Result<bool> {
        queue.mark_syncing(entry.id).await?;

        let result = match &entry.submission_id {
            Some(submission_id) => {
                submitter.retry_submission(submission_id, entry.company_id, entry.created_by).await
            }
            None => {
                let request = SubmissionRequest {
                    company_id: entry.company_id,
                    actor_id: entry.created_by,
                    actor_name: entry.created_by_name.clone(),
                    payload: entry.payload.clone(),
                };
                let result = submitter.submit_offline(request).await;
                if let Ok(outcome) = &result {
                    if let Err(err) = queue.bind_submission(entry.id, &outcome.submission_id).await
                    {
                        warn!(entry_id = entry.id, error = %err, "bind_submission failed");
                    }
                }
                result
            }
        };

        match result {
            Ok(outcome) if outcome.success => {
                debug!(
                    entry_id = entry.id,
                    submission_id = %outcome.submission_id,
                    order_ref = outcome.order_ref,
                    "Offline entry synced"
                );
                queue.mark_synced(entry.id).await?;
                Ok(true)
            }
            Ok(outcome) => {
                let (reason, retryable) = match &outcome.error {
                    Some(failure) => (failure.message.clone(), failure.is_retryable()),
                    None => ("submission failed without detail".into(), true),
                };
                Self::settle_failure(queue, config, entry, &reason, retryable).await?;
                Ok(false)
            }
            Err(err) => {
                let retryable = matches!(
                    err,
                    OrderBridgeError::Persistence(_)
                        | OrderBridgeError::Internal(_)
                        | OrderBridgeError::GatewayTransient(_)
                );
                Self::settle_failure(queue, config, entry, &err.to_string(), retryable).await?;
                Ok(false)
            }
        }
    }

    /// Record a failed replay: schedule the next attempt with backoff, or
    /// park the entry when retries are exhausted or the failure is final.
    async fn settle_failure(
        queue: &Arc<dyn OfflineQueue>,
        config: &SyncWorkerConfig,
        entry: &PendingOfflineOrder,
        reason: &str,
        retryable: bool,
    ) -> Result<()> {
        let attempts_after = entry.attempts.saturating_add(1);
        let reason = truncate_reason(reason);

        if !retryable || config.retry.is_exhausted(attempts_after) {
            warn!(
                entry_id = entry.id,
                attempts = attempts_after,
                retryable = retryable,
                reason = %reason,
                "Parking offline entry"
            );
            queue.mark_failed(entry.id, &reason, None).await?;
            return Ok(());
        }

        let delay = config.retry.delay_for(attempts_after);
        let next_attempt_at = Utc::now()
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::seconds(5));
        debug!(
            entry_id = entry.id,
            attempts = attempts_after,
            delay_secs = delay.as_secs(),
            reason = %reason,
            "Scheduling offline entry retry"
        );
        queue.mark_failed(entry.id, &reason, Some(next_attempt_at)).await?;
        Ok(())
    }
}

fn truncate_reason(reason: &str) -> String {
    const MAX_LEN: usize = 256;
    if reason.len() <= MAX_LEN {
        return reason.to_string();
    }

    let mut truncated = reason.chars().take(MAX_LEN.saturating_sub(3)).collect::<String>();
    truncated.push_str("...");
    truncated
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SyncWorker dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
