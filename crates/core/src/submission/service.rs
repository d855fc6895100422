//! Submission orchestrator
//!
//! One algorithm drives the quick, lead-linked, and offline-replay flows:
//! validate, gate, durably record a pessimistic failed outbox entry, then
//! attempt the ERP call and settle the record in place. The outbox write
//! must complete before the gateway sees the payload; a crash between the
//! two leaves an auditable failed record instead of a silently lost order.

use std::sync::Arc;

use chrono::Utc;
use orderbridge_domain::{
    OrderBridgeError, OrderPayload, Result, SubmissionFailure, SubmissionOrigin, SubmissionRecord,
    SubmissionStatus,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::ports::{AccessGate, ErpGateway, SubmissionOutbox};
use super::side_effects::{SideEffect, SideEffectDispatcher};

/// Caller identity and payload for one submission.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// Tenant scope
    pub company_id: i64,
    /// Acting user
    pub actor_id: i64,
    /// Acting user display name, for audit
    pub actor_name: String,
    /// The candidate order
    pub payload: OrderPayload,
}

/// Typed outcome of a submission attempt.
///
/// Gateway failures settle into an unsuccessful outcome rather than an
/// error: the attempt is recorded and the caller may retry. Boundary
/// rejections (validation, authorization, outbox write failure) are `Err`
/// instead, since no attempt was ever recorded (or recordable).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    /// The outbox record backing this submission
    pub submission_id: String,
    /// Whether the ERP accepted the order
    pub success: bool,
    /// ERP-assigned order reference, on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_ref: Option<i64>,
    /// Structured failure detail, on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SubmissionFailure>,
    /// Whether the failure was a connectivity loss rather than an ERP answer
    pub was_offline: bool,
}

impl SubmissionOutcome {
    fn succeeded(submission_id: String, order_ref: i64) -> Self {
        Self { submission_id, success: true, order_ref: Some(order_ref), error: None, was_offline: false }
    }

    fn failed(submission_id: String, error: SubmissionFailure) -> Self {
        Self { submission_id, success: false, order_ref: None, error: Some(error), was_offline: false }
    }
}

/// Drives Outbox → Gateway → post-success side effects for every origin.
pub struct SubmissionService {
    outbox: Arc<dyn SubmissionOutbox>,
    gateway: Arc<dyn ErpGateway>,
    access: Arc<dyn AccessGate>,
    side_effects: SideEffectDispatcher,
}

impl SubmissionService {
    /// Wire the orchestrator over its ports.
    pub fn new(
        outbox: Arc<dyn SubmissionOutbox>,
        gateway: Arc<dyn ErpGateway>,
        access: Arc<dyn AccessGate>,
        side_effects: SideEffectDispatcher,
    ) -> Self {
        Self { outbox, gateway, access, side_effects }
    }

    /// Submit a quick order, not linked to any lead.
    #[instrument(skip(self, request), fields(company_id = request.company_id, actor_id = request.actor_id))]
    pub async fn submit_quick(&self, request: SubmissionRequest) -> Result<SubmissionOutcome> {
        self.submit_inner(SubmissionOrigin::Quick, None, request).await
    }

    /// Submit an order linked to an originating lead. On success the lead is
    /// marked won, best-effort.
    #[instrument(skip(self, request), fields(company_id = request.company_id, actor_id = request.actor_id, lead_ref))]
    pub async fn submit_for_lead(
        &self,
        request: SubmissionRequest,
        lead_ref: i64,
    ) -> Result<SubmissionOutcome> {
        self.submit_inner(SubmissionOrigin::Lead, Some(lead_ref), request).await
    }

    /// Replay an order captured offline. Used by the sync worker.
    #[instrument(skip(self, request), fields(company_id = request.company_id, actor_id = request.actor_id))]
    pub async fn submit_offline(&self, request: SubmissionRequest) -> Result<SubmissionOutcome> {
        self.submit_inner(SubmissionOrigin::Offline, None, request).await
    }

    /// Re-attempt an existing submission, reusing its record.
    ///
    /// A completed submission is immutable going forward: retrying after
    /// success is a no-op returning the already-stored order reference.
    #[instrument(skip(self), fields(company_id, actor_id))]
    pub async fn retry(
        &self,
        submission_id: &str,
        company_id: i64,
        actor_id: i64,
    ) -> Result<SubmissionOutcome> {
        let access = self.access.user_access(actor_id, company_id).await?;
        if !access.can_create_or_edit() {
            return Err(OrderBridgeError::Authorization(
                "user has no seller linkage and is not an administrator".into(),
            ));
        }

        let record = self
            .outbox
            .get(submission_id)
            .await?
            .filter(|record| record.company_id == company_id)
            .ok_or_else(|| {
                OrderBridgeError::NotFound(format!("submission {submission_id} not found"))
            })?;

        if record.status == SubmissionStatus::Succeeded {
            let order_ref = record.order_ref.ok_or_else(|| {
                OrderBridgeError::Internal(format!(
                    "succeeded submission {submission_id} has no order reference"
                ))
            })?;
            info!(submission_id, order_ref, "retry of a succeeded submission is a no-op");
            return Ok(SubmissionOutcome::succeeded(record.id, order_ref));
        }

        let attempt_count = self.outbox.record_attempt(&record.id).await?;
        info!(submission_id, attempt_count, "re-attempting submission");

        Ok(self.attempt(&record).await)
    }

    /// Shared algorithm for all first-time submissions.
    async fn submit_inner(
        &self,
        origin: SubmissionOrigin,
        lead_ref: Option<i64>,
        request: SubmissionRequest,
    ) -> Result<SubmissionOutcome> {
        // Rejected before any persistence: caller's fault, nothing to audit.
        request.payload.validate()?;

        let access = self.access.user_access(request.actor_id, request.company_id).await?;
        if !access.can_create_or_edit() {
            return Err(OrderBridgeError::Authorization(
                "user has no seller linkage and is not an administrator".into(),
            ));
        }

        let now = Utc::now();
        let record = SubmissionRecord {
            id: Uuid::now_v7().to_string(),
            company_id: request.company_id,
            origin,
            lead_ref,
            payload: request.payload,
            idempotency_key: Uuid::new_v4().to_string(),
            status: SubmissionStatus::Failed,
            order_ref: None,
            error: None,
            attempt_count: 1,
            created_by: request.actor_id,
            created_by_name: request.actor_name,
            created_at: now,
            last_attempt_at: now,
        };

        // Write-ahead: the record must be durable before any network call.
        self.outbox
            .insert(&record)
            .await
            .map_err(|err| OrderBridgeError::Persistence(err.to_string()))?;

        info!(
            submission_id = %record.id,
            origin = %origin,
            attempt_count = record.attempt_count,
            "submission recorded, invoking gateway"
        );

        Ok(self.attempt(&record).await)
    }

    /// One gateway attempt against an already-persisted record.
    async fn attempt(&self, record: &SubmissionRecord) -> SubmissionOutcome {
        match self.gateway.create_order(&record.payload, &record.idempotency_key).await {
            Ok(order_ref) => {
                // The ERP has durably accepted the order: from here on,
                // bookkeeping failures must not turn into caller-visible
                // submission failures.
                if let Err(err) = self.outbox.mark_succeeded(&record.id, order_ref).await {
                    warn!(
                        submission_id = %record.id,
                        order_ref,
                        error = %err,
                        "order created but outbox record was not settled"
                    );
                }

                if record.origin == SubmissionOrigin::Lead {
                    if let Some(lead_ref) = record.lead_ref {
                        self.side_effects
                            .apply(
                                SideEffect::MarkLeadWon {
                                    company_id: record.company_id,
                                    lead_ref,
                                },
                                &record.id,
                            )
                            .await;
                    }
                }

                info!(submission_id = %record.id, order_ref, "submission succeeded");
                SubmissionOutcome::succeeded(record.id.clone(), order_ref)
            }
            Err(gateway_err) => {
                let failure = SubmissionFailure::now(
                    gateway_err.category().failure_code(),
                    gateway_err.message(),
                );

                if let Err(err) = self.outbox.mark_failed(&record.id, &failure).await {
                    warn!(
                        submission_id = %record.id,
                        error = %err,
                        "failed attempt could not be recorded on the outbox entry"
                    );
                }

                warn!(
                    submission_id = %record.id,
                    code = %failure.code,
                    error = %gateway_err,
                    "submission failed"
                );
                SubmissionOutcome::failed(record.id.clone(), failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use orderbridge_domain::{
        FailureCode, GatewayError, GatewayErrorCategory, LeadStatus, OrderItem, Result as DomainResult,
        SubmissionFilter, SubmissionSummary, UserAccess, Visibility,
    };
    use tokio::sync::Mutex as TokioMutex;

    use super::*;
    use crate::submission::ports::LeadRepository;

    type EventLog = Arc<TokioMutex<Vec<String>>>;
    type RecordStore = Arc<TokioMutex<HashMap<String, SubmissionRecord>>>;
    type GatewayResponses = TokioMutex<Vec<std::result::Result<i64, GatewayError>>>;

    fn sample_payload() -> OrderPayload {
        OrderPayload {
            partner: 42,
            items: vec![OrderItem { sku: "A1".into(), qty: 2, price: 10.0 }],
            total: 20.0,
        }
    }

    fn sample_request() -> SubmissionRequest {
        SubmissionRequest {
            company_id: 1,
            actor_id: 7,
            actor_name: "Ana".into(),
            payload: sample_payload(),
        }
    }

    struct MockOutbox {
        records: RecordStore,
        events: EventLog,
        fail_insert: bool,
    }

    impl MockOutbox {
        fn new(events: EventLog) -> Self {
            Self { records: Arc::new(TokioMutex::new(HashMap::new())), events, fail_insert: false }
        }

        fn with_failing_insert(mut self) -> Self {
            self.fail_insert = true;
            self
        }

        async fn record(&self, id: &str) -> Option<SubmissionRecord> {
            self.records.lock().await.get(id).cloned()
        }

        async fn record_count(&self) -> usize {
            self.records.lock().await.len()
        }

        async fn seed(&self, record: SubmissionRecord) {
            self.records.lock().await.insert(record.id.clone(), record);
        }
    }

    #[async_trait]
    impl SubmissionOutbox for MockOutbox {
        async fn insert(&self, record: &SubmissionRecord) -> DomainResult<()> {
            if self.fail_insert {
                return Err(OrderBridgeError::Persistence("disk full".into()));
            }
            self.events.lock().await.push(format!("insert:{}", record.id));
            self.records.lock().await.insert(record.id.clone(), record.clone());
            Ok(())
        }

        async fn mark_succeeded(&self, id: &str, order_ref: i64) -> DomainResult<()> {
            self.events.lock().await.push(format!("mark_succeeded:{id}"));
            let mut records = self.records.lock().await;
            let record = records
                .get_mut(id)
                .ok_or_else(|| OrderBridgeError::NotFound(id.to_string()))?;
            record.status = SubmissionStatus::Succeeded;
            record.order_ref = Some(order_ref);
            record.error = None;
            Ok(())
        }

        async fn mark_failed(&self, id: &str, failure: &SubmissionFailure) -> DomainResult<()> {
            self.events.lock().await.push(format!("mark_failed:{id}"));
            let mut records = self.records.lock().await;
            let record = records
                .get_mut(id)
                .ok_or_else(|| OrderBridgeError::NotFound(id.to_string()))?;
            record.status = SubmissionStatus::Failed;
            record.error = Some(failure.clone());
            Ok(())
        }

        async fn record_attempt(&self, id: &str) -> DomainResult<u32> {
            let mut records = self.records.lock().await;
            let record = records
                .get_mut(id)
                .ok_or_else(|| OrderBridgeError::NotFound(id.to_string()))?;
            record.attempt_count += 1;
            record.last_attempt_at = Utc::now();
            Ok(record.attempt_count)
        }

        async fn get(&self, id: &str) -> DomainResult<Option<SubmissionRecord>> {
            Ok(self.records.lock().await.get(id).cloned())
        }

        async fn list(
            &self,
            _company_id: i64,
            _filter: &SubmissionFilter,
            _visibility: &Visibility,
        ) -> DomainResult<Vec<SubmissionRecord>> {
            Ok(self.records.lock().await.values().cloned().collect())
        }

        async fn summary(
            &self,
            _company_id: i64,
            _visibility: &Visibility,
        ) -> DomainResult<SubmissionSummary> {
            Ok(SubmissionSummary::default())
        }
    }

    struct MockGateway {
        responses: GatewayResponses,
        events: EventLog,
        calls: TokioMutex<Vec<String>>,
    }

    impl MockGateway {
        fn new(responses: Vec<std::result::Result<i64, GatewayError>>, events: EventLog) -> Self {
            Self {
                responses: TokioMutex::new(responses),
                events,
                calls: TokioMutex::new(Vec::new()),
            }
        }

        async fn idempotency_keys(&self) -> Vec<String> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl ErpGateway for MockGateway {
        async fn create_order(
            &self,
            _payload: &OrderPayload,
            idempotency_key: &str,
        ) -> std::result::Result<i64, GatewayError> {
            self.events.lock().await.push("gateway".into());
            self.calls.lock().await.push(idempotency_key.to_string());
            let mut responses = self.responses.lock().await;
            if responses.is_empty() {
                Ok(9001)
            } else {
                responses.remove(0)
            }
        }
    }

    struct MockAccess {
        allowed: bool,
    }

    #[async_trait]
    impl AccessGate for MockAccess {
        async fn user_access(&self, user_id: i64, company_id: i64) -> DomainResult<UserAccess> {
            Ok(UserAccess {
                user_id,
                company_id,
                role: "Vendedor".into(),
                seller_code: if self.allowed { Some(12) } else { None },
                is_admin: false,
                team_user_ids: vec![user_id],
            })
        }
    }

    struct MockLeads {
        status: Option<LeadStatus>,
        fail_mark: bool,
        won: TokioMutex<Vec<i64>>,
    }

    impl MockLeads {
        fn new(status: Option<LeadStatus>) -> Self {
            Self { status, fail_mark: false, won: TokioMutex::new(Vec::new()) }
        }

        fn with_failing_mark(mut self) -> Self {
            self.fail_mark = true;
            self
        }

        async fn won_leads(&self) -> Vec<i64> {
            self.won.lock().await.clone()
        }
    }

    #[async_trait]
    impl LeadRepository for MockLeads {
        async fn status(&self, _company_id: i64, _lead_ref: i64) -> DomainResult<Option<LeadStatus>> {
            Ok(self.status)
        }

        async fn mark_won(&self, _company_id: i64, lead_ref: i64) -> DomainResult<()> {
            if self.fail_mark {
                return Err(OrderBridgeError::Internal("lead service down".into()));
            }
            self.won.lock().await.push(lead_ref);
            Ok(())
        }
    }

    struct Harness {
        service: SubmissionService,
        outbox: Arc<MockOutbox>,
        gateway: Arc<MockGateway>,
        leads: Arc<MockLeads>,
        events: EventLog,
    }

    fn harness(
        responses: Vec<std::result::Result<i64, GatewayError>>,
        allowed: bool,
        leads: MockLeads,
    ) -> Harness {
        let events: EventLog = Arc::new(TokioMutex::new(Vec::new()));
        let outbox = Arc::new(MockOutbox::new(events.clone()));
        let gateway = Arc::new(MockGateway::new(responses, events.clone()));
        let leads = Arc::new(leads);
        let service = SubmissionService::new(
            outbox.clone(),
            gateway.clone(),
            Arc::new(MockAccess { allowed }),
            SideEffectDispatcher::new(leads.clone()),
        );
        Harness { service, outbox, gateway, leads, events }
    }

    #[tokio::test]
    async fn quick_order_success_settles_record() {
        let h = harness(vec![Ok(9001)], true, MockLeads::new(None));

        let outcome = h.service.submit_quick(sample_request()).await.expect("submit runs");

        assert!(outcome.success);
        assert_eq!(outcome.order_ref, Some(9001));

        let record = h.outbox.record(&outcome.submission_id).await.expect("record stored");
        assert_eq!(record.status, SubmissionStatus::Succeeded);
        assert_eq!(record.order_ref, Some(9001));
        assert_eq!(record.attempt_count, 1);
        assert!(record.error.is_none());
        assert_eq!(record.origin, SubmissionOrigin::Quick);
    }

    #[tokio::test]
    async fn record_is_persisted_before_the_gateway_is_invoked() {
        let h = harness(vec![Ok(9001)], true, MockLeads::new(None));

        let outcome = h.service.submit_quick(sample_request()).await.expect("submit runs");

        let events = h.events.lock().await.clone();
        assert_eq!(
            events,
            vec![
                format!("insert:{}", outcome.submission_id),
                "gateway".to_string(),
                format!("mark_succeeded:{}", outcome.submission_id),
            ]
        );
    }

    #[tokio::test]
    async fn gateway_timeout_records_transient_failure() {
        let h = harness(
            vec![Err(GatewayError::new(GatewayErrorCategory::NetworkTimeout, "timeout"))],
            true,
            MockLeads::new(None),
        );

        let outcome = h.service.submit_quick(sample_request()).await.expect("submit runs");

        assert!(!outcome.success);
        assert!(!outcome.was_offline);
        let failure = outcome.error.expect("failure attached");
        assert_eq!(failure.code, FailureCode::GatewayTransient);
        assert_eq!(failure.message, "timeout");

        let record = h.outbox.record(&outcome.submission_id).await.expect("record stored");
        assert_eq!(record.status, SubmissionStatus::Failed);
        assert_eq!(record.attempt_count, 1);
        assert!(record.order_ref.is_none());
    }

    #[tokio::test]
    async fn gateway_rejection_is_not_retryable() {
        let h = harness(
            vec![Err(GatewayError::from_status(422, "Unprocessable Entity"))],
            true,
            MockLeads::new(None),
        );

        let outcome = h.service.submit_quick(sample_request()).await.expect("submit runs");

        let failure = outcome.error.expect("failure attached");
        assert_eq!(failure.code, FailureCode::GatewayRejected);
        assert!(!failure.is_retryable());
    }

    #[tokio::test]
    async fn invalid_payload_is_rejected_before_persistence() {
        let h = harness(vec![], true, MockLeads::new(None));
        let mut request = sample_request();
        request.payload.items.clear();

        let result = h.service.submit_quick(request).await;

        assert!(matches!(result, Err(OrderBridgeError::Validation(_))));
        assert_eq!(h.outbox.record_count().await, 0);
        assert!(h.gateway.idempotency_keys().await.is_empty());
    }

    #[tokio::test]
    async fn denied_actor_writes_nothing() {
        let h = harness(vec![], false, MockLeads::new(None));

        let result = h.service.submit_quick(sample_request()).await;

        assert!(matches!(result, Err(OrderBridgeError::Authorization(_))));
        assert_eq!(h.outbox.record_count().await, 0);
        assert!(h.gateway.idempotency_keys().await.is_empty());
    }

    #[tokio::test]
    async fn outbox_write_failure_aborts_before_gateway() {
        let events: EventLog = Arc::new(TokioMutex::new(Vec::new()));
        let outbox = Arc::new(MockOutbox::new(events.clone()).with_failing_insert());
        let gateway = Arc::new(MockGateway::new(vec![Ok(9001)], events));
        let leads = Arc::new(MockLeads::new(None));
        let service = SubmissionService::new(
            outbox,
            gateway.clone(),
            Arc::new(MockAccess { allowed: true }),
            SideEffectDispatcher::new(leads),
        );

        let result = service.submit_quick(sample_request()).await;

        assert!(matches!(result, Err(OrderBridgeError::Persistence(_))));
        assert!(gateway.idempotency_keys().await.is_empty());
    }

    #[tokio::test]
    async fn lead_linked_success_marks_lead_won() {
        let h = harness(vec![Ok(5150)], true, MockLeads::new(Some(LeadStatus::InProgress)));

        let outcome =
            h.service.submit_for_lead(sample_request(), 77).await.expect("submit runs");

        assert!(outcome.success);
        assert_eq!(h.leads.won_leads().await, vec![77]);

        let record = h.outbox.record(&outcome.submission_id).await.expect("record stored");
        assert_eq!(record.origin, SubmissionOrigin::Lead);
        assert_eq!(record.lead_ref, Some(77));
    }

    #[tokio::test]
    async fn lead_update_failure_does_not_fail_the_submission() {
        let h = harness(
            vec![Ok(5150)],
            true,
            MockLeads::new(Some(LeadStatus::InProgress)).with_failing_mark(),
        );

        let outcome =
            h.service.submit_for_lead(sample_request(), 77).await.expect("submit runs");

        assert!(outcome.success);
        assert_eq!(outcome.order_ref, Some(5150));
        assert!(h.leads.won_leads().await.is_empty());
    }

    #[tokio::test]
    async fn quick_order_never_touches_leads() {
        let h = harness(vec![Ok(9001)], true, MockLeads::new(Some(LeadStatus::InProgress)));

        h.service.submit_quick(sample_request()).await.expect("submit runs");

        assert!(h.leads.won_leads().await.is_empty());
    }

    #[tokio::test]
    async fn retry_reuses_the_record_and_its_idempotency_key() {
        let h = harness(
            vec![
                Err(GatewayError::new(GatewayErrorCategory::ServerUnavailable, "503")),
                Ok(9001),
            ],
            true,
            MockLeads::new(None),
        );

        let first = h.service.submit_quick(sample_request()).await.expect("submit runs");
        assert!(!first.success);

        let second =
            h.service.retry(&first.submission_id, 1, 7).await.expect("retry runs");
        assert!(second.success);
        assert_eq!(second.submission_id, first.submission_id);

        let record = h.outbox.record(&first.submission_id).await.expect("record stored");
        assert_eq!(record.attempt_count, 2);
        assert_eq!(record.status, SubmissionStatus::Succeeded);
        assert_eq!(h.outbox.record_count().await, 1);

        let keys = h.gateway.idempotency_keys().await;
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0], keys[1]);
    }

    #[tokio::test]
    async fn retry_after_success_is_a_no_op() {
        let h = harness(vec![Ok(9001)], true, MockLeads::new(None));

        let first = h.service.submit_quick(sample_request()).await.expect("submit runs");
        assert!(first.success);

        let again = h.service.retry(&first.submission_id, 1, 7).await.expect("retry runs");
        assert!(again.success);
        assert_eq!(again.order_ref, Some(9001));

        // No second gateway call, no extra attempt
        assert_eq!(h.gateway.idempotency_keys().await.len(), 1);
        let record = h.outbox.record(&first.submission_id).await.expect("record stored");
        assert_eq!(record.attempt_count, 1);
    }

    #[tokio::test]
    async fn retry_is_tenant_scoped() {
        let h = harness(
            vec![Err(GatewayError::new(GatewayErrorCategory::NetworkTimeout, "timeout"))],
            true,
            MockLeads::new(None),
        );

        let first = h.service.submit_quick(sample_request()).await.expect("submit runs");

        let result = h.service.retry(&first.submission_id, 99, 7).await;
        assert!(matches!(result, Err(OrderBridgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn retry_of_unknown_submission_is_not_found() {
        let h = harness(vec![], true, MockLeads::new(None));

        let result = h.service.retry("missing", 1, 7).await;
        assert!(matches!(result, Err(OrderBridgeError::NotFound(_))));
    }

    #[tokio::test]
    async fn retry_of_failed_lead_submission_dispatches_side_effect() {
        let h = harness(
            vec![
                Err(GatewayError::new(GatewayErrorCategory::NetworkTimeout, "timeout")),
                Ok(5150),
            ],
            true,
            MockLeads::new(Some(LeadStatus::InProgress)),
        );

        let first = h.service.submit_for_lead(sample_request(), 77).await.expect("submit runs");
        assert!(!first.success);
        assert!(h.leads.won_leads().await.is_empty());

        let second = h.service.retry(&first.submission_id, 1, 7).await.expect("retry runs");
        assert!(second.success);
        assert_eq!(h.leads.won_leads().await, vec![77]);
    }

    #[tokio::test]
    async fn seeded_succeeded_record_short_circuits_retry() {
        let h = harness(vec![], true, MockLeads::new(None));
        let now = Utc::now();
        h.outbox
            .seed(SubmissionRecord {
                id: "sub-seeded".into(),
                company_id: 1,
                origin: SubmissionOrigin::Offline,
                lead_ref: None,
                payload: sample_payload(),
                idempotency_key: "idem-seeded".into(),
                status: SubmissionStatus::Succeeded,
                order_ref: Some(4242),
                error: None,
                attempt_count: 3,
                created_by: 7,
                created_by_name: "Ana".into(),
                created_at: now,
                last_attempt_at: now,
            })
            .await;

        let outcome = h.service.retry("sub-seeded", 1, 7).await.expect("retry runs");
        assert!(outcome.success);
        assert_eq!(outcome.order_ref, Some(4242));
        assert!(h.gateway.idempotency_keys().await.is_empty());
    }
}
