//! Liveness endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::ApiError;

/// Report process liveness and database reachability.
pub async fn health(State(ctx): State<Arc<AppContext>>) -> Result<Json<Value>, ApiError> {
    ctx.db.health_check()?;
    Ok(Json(json!({ "status": "ok" })))
}
