//! Post-success side-effect dispatcher
//!
//! Best-effort actions that follow a successful submission. The ERP has
//! already durably accepted the order at this point, so a side-effect
//! failure is logged and never surfaces as a submission failure: reporting
//! failure would make the caller retry and risk a duplicate ERP order.

use std::sync::Arc;

use orderbridge_domain::LeadStatus;
use tracing::{debug, warn};

use super::ports::LeadRepository;

/// Side effects the pipeline knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Mark the originating lead as won after a lead-linked order succeeded.
    MarkLeadWon {
        /// Tenant scope
        company_id: i64,
        /// The originating lead
        lead_ref: i64,
    },
}

/// Applies side effects without ever propagating an error to the submitter.
pub struct SideEffectDispatcher {
    leads: Arc<dyn LeadRepository>,
}

impl SideEffectDispatcher {
    /// Create a dispatcher over the lead collaborator.
    pub fn new(leads: Arc<dyn LeadRepository>) -> Self {
        Self { leads }
    }

    /// Apply a side effect. Failures are logged with full context and
    /// swallowed; a lead already won is not transitioned again.
    pub async fn apply(&self, effect: SideEffect, submission_id: &str) {
        match effect {
            SideEffect::MarkLeadWon { company_id, lead_ref } => {
                self.mark_lead_won(company_id, lead_ref, submission_id).await;
            }
        }
    }

    async fn mark_lead_won(&self, company_id: i64, lead_ref: i64, submission_id: &str) {
        match self.leads.status(company_id, lead_ref).await {
            Ok(Some(LeadStatus::Won)) => {
                debug!(submission_id, lead_ref, "lead already won, skipping transition");
            }
            Ok(Some(_)) | Ok(None) => {
                if let Err(err) = self.leads.mark_won(company_id, lead_ref).await {
                    warn!(
                        submission_id,
                        lead_ref,
                        error = %err,
                        "order created but lead was not marked won"
                    );
                }
            }
            Err(err) => {
                warn!(
                    submission_id,
                    lead_ref,
                    error = %err,
                    "could not read lead status, skipping mark-won side effect"
                );
            }
        }
    }
}
