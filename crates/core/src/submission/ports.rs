//! Port interfaces for the submission pipeline

use async_trait::async_trait;
use orderbridge_domain::{
    GatewayError, LeadStatus, OrderPayload, Result, SubmissionFailure, SubmissionFilter,
    SubmissionRecord, SubmissionSummary, UserAccess, Visibility,
};

/// Durable, server-visible ledger of every submission attempt.
///
/// The orchestrator writes a record here before any gateway call; all later
/// mutations target the same row.
#[async_trait]
pub trait SubmissionOutbox: Send + Sync {
    /// Durably insert a new record. Must complete before the gateway call.
    async fn insert(&self, record: &SubmissionRecord) -> Result<()>;

    /// Flip a record to succeeded with the ERP-assigned reference, clearing
    /// any stored error.
    async fn mark_succeeded(&self, id: &str, order_ref: i64) -> Result<()>;

    /// Record a settled failed attempt.
    async fn mark_failed(&self, id: &str, failure: &SubmissionFailure) -> Result<()>;

    /// Atomically increment the attempt counter and stamp the attempt time,
    /// returning the new count. Serializes concurrent retries of the same
    /// logical submission.
    async fn record_attempt(&self, id: &str) -> Result<u32>;

    /// Fetch a record by id.
    async fn get(&self, id: &str) -> Result<Option<SubmissionRecord>>;

    /// Operator read path: filtered listing within one tenant, restricted by
    /// the caller's visibility tier, newest first.
    async fn list(
        &self,
        company_id: i64,
        filter: &SubmissionFilter,
        visibility: &Visibility,
    ) -> Result<Vec<SubmissionRecord>>;

    /// Aggregate failed/succeeded counters, restricted by the caller's
    /// visibility tier like `list`.
    async fn summary(&self, company_id: i64, visibility: &Visibility) -> Result<SubmissionSummary>;
}

/// The component that performs the actual order creation in the ERP.
#[async_trait]
pub trait ErpGateway: Send + Sync {
    /// Create the order, returning the ERP-assigned order reference.
    ///
    /// The idempotency key rides on every attempt for the same record so the
    /// ERP can de-duplicate a retry after an ambiguous timeout.
    async fn create_order(
        &self,
        payload: &OrderPayload,
        idempotency_key: &str,
    ) -> std::result::Result<i64, GatewayError>;
}

/// External lead entity, referenced not owned: the pipeline reads status and
/// only ever transitions a lead to won.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Current lead status, `None` when the lead does not exist.
    async fn status(&self, company_id: i64, lead_ref: i64) -> Result<Option<LeadStatus>>;

    /// Transition the lead to won.
    async fn mark_won(&self, company_id: i64, lead_ref: i64) -> Result<()>;
}

/// Authorization collaborator, consumed as a gating predicate.
#[async_trait]
pub trait AccessGate: Send + Sync {
    /// Resolve the actor's access context within a tenant.
    async fn user_access(&self, user_id: i64, company_id: i64) -> Result<UserAccess>;
}
