//! HTTP routes
//!
//! All order and submission routes require the actor headers `x-user-id`
//! and `x-company-id`; identity verification itself happens upstream.

mod actor;
mod health;
mod orders;
mod submissions;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

pub use actor::Actor;

use crate::context::AppContext;

/// Build the application router over the wired context.
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/orders/quick", post(orders::submit_quick))
        .route("/api/orders/lead", post(orders::submit_lead))
        .route("/api/orders/offline", post(orders::enqueue_offline))
        .route("/api/submissions", get(submissions::list))
        .route("/api/submissions/summary", get(submissions::summary))
        .route("/api/submissions/{id}/retry", post(submissions::retry))
        .with_state(ctx)
}
