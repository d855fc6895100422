//! Order submission routes

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use orderbridge_core::SubmissionRequest;
use orderbridge_domain::{NewOfflineOrder, OrderBridgeError, OrderPayload};
use serde::Deserialize;
use serde_json::{json, Value};

use super::Actor;
use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickOrderBody {
    order: OrderPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadOrderBody {
    order: OrderPayload,
    lead_ref: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineOrderBody {
    order: OrderPayload,
}

fn request_for(actor: &Actor, payload: OrderPayload) -> SubmissionRequest {
    SubmissionRequest {
        company_id: actor.company_id,
        actor_id: actor.user_id,
        actor_name: actor.user_name.clone(),
        payload,
    }
}

/// Submit a quick order straight through the pipeline.
pub async fn submit_quick(
    State(ctx): State<Arc<AppContext>>,
    actor: Actor,
    Json(body): Json<QuickOrderBody>,
) -> Result<Json<Value>, ApiError> {
    let outcome = ctx.submissions.submit_quick(request_for(&actor, body.order)).await?;
    Ok(Json(serde_json::to_value(outcome).map_err(encode_error)?))
}

/// Submit an order converting a lead.
pub async fn submit_lead(
    State(ctx): State<Arc<AppContext>>,
    actor: Actor,
    Json(body): Json<LeadOrderBody>,
) -> Result<Json<Value>, ApiError> {
    let outcome =
        ctx.submissions.submit_for_lead(request_for(&actor, body.order), body.lead_ref).await?;
    Ok(Json(serde_json::to_value(outcome).map_err(encode_error)?))
}

/// Capture an order into the device-local offline queue.
///
/// The payload is validated and the actor gated up front, so a queued entry
/// can only fail later for gateway or infrastructure reasons.
pub async fn enqueue_offline(
    State(ctx): State<Arc<AppContext>>,
    actor: Actor,
    Json(body): Json<OfflineOrderBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    body.order.validate().map_err(ApiError::from)?;

    let access = ctx.access.user_access(actor.user_id, actor.company_id).await?;
    if !access.can_create_or_edit() {
        return Err(OrderBridgeError::Authorization(
            "user has no seller linkage and is not an administrator".into(),
        )
        .into());
    }

    let entry_id = ctx
        .offline_queue
        .enqueue(&NewOfflineOrder {
            company_id: actor.company_id,
            payload: body.order,
            created_by: actor.user_id,
            created_by_name: actor.user_name,
        })
        .await?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "success": true, "queued": true, "entryId": entry_id }))))
}

fn encode_error(err: serde_json::Error) -> ApiError {
    ApiError(OrderBridgeError::Internal(format!("response encoding failed: {err}")))
}
