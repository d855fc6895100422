//! Acting-user extraction from request headers

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Caller identity, taken from the `x-user-id` and `x-company-id` headers.
///
/// The optional `x-user-name` header carries the display name recorded on
/// the submission for audit.
#[derive(Debug, Clone)]
pub struct Actor {
    /// Acting user id
    pub user_id: i64,
    /// Tenant scope
    pub company_id: i64,
    /// Display name for audit trails
    pub user_name: String,
}

/// Missing or malformed identity headers reject with 401 before any handler
/// logic runs.
pub struct ActorRejection(&'static str);

impl IntoResponse for ActorRejection {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "error": self.0, "offline": false });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ActorRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_i64(parts, "x-user-id")
            .ok_or(ActorRejection("missing or invalid x-user-id header"))?;
        let company_id = header_i64(parts, "x-company-id")
            .ok_or(ActorRejection("missing or invalid x-company-id header"))?;
        let user_name = parts
            .headers
            .get("x-user-name")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        Ok(Self { user_id, company_id, user_name })
    }
}

fn header_i64(parts: &Parts, name: &str) -> Option<i64> {
    parts.headers.get(name)?.to_str().ok()?.parse().ok()
}
