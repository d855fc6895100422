//! Submission history routes

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use orderbridge_domain::{
    OrderBridgeError, SubmissionFilter, SubmissionOrigin, SubmissionRecord, SubmissionStatus,
    SubmissionSummary,
};
use serde::Deserialize;
use serde_json::Value;

use super::Actor;
use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    origin: Option<String>,
    status: Option<String>,
    #[serde(rename = "leadRef")]
    lead_ref: Option<i64>,
}

impl ListQuery {
    fn into_filter(self) -> Result<SubmissionFilter, OrderBridgeError> {
        let origin = self
            .origin
            .map(|raw| raw.parse::<SubmissionOrigin>().map_err(OrderBridgeError::Validation))
            .transpose()?;
        let status = self
            .status
            .map(|raw| raw.parse::<SubmissionStatus>().map_err(OrderBridgeError::Validation))
            .transpose()?;
        Ok(SubmissionFilter { origin, status, lead_ref: self.lead_ref })
    }
}

/// List the actor's visible submissions, newest first.
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    actor: Actor,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SubmissionRecord>>, ApiError> {
    let access = ctx.access.user_access(actor.user_id, actor.company_id).await?;
    let filter = query.into_filter()?;
    let records = ctx.outbox.list(actor.company_id, &filter, &access.visibility()).await?;
    Ok(Json(records))
}

/// Failed/succeeded counts over the actor's visible submissions.
pub async fn summary(
    State(ctx): State<Arc<AppContext>>,
    actor: Actor,
) -> Result<Json<SubmissionSummary>, ApiError> {
    let access = ctx.access.user_access(actor.user_id, actor.company_id).await?;
    let summary = ctx.outbox.summary(actor.company_id, &access.visibility()).await?;
    Ok(Json(summary))
}

/// Re-attempt a failed submission, reusing its outbox record.
pub async fn retry(
    State(ctx): State<Arc<AppContext>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let outcome = ctx.submissions.retry(&id, actor.company_id, actor.user_id).await?;
    let value = serde_json::to_value(outcome)
        .map_err(|e| OrderBridgeError::Internal(format!("response encoding failed: {e}")))?;
    Ok(Json(value))
}
