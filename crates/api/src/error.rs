//! HTTP error mapping
//!
//! Translates `OrderBridgeError` into status codes and the JSON failure
//! envelope clients consume. Validation rejections additionally set a
//! `validationError` flag so clients can distinguish a bad payload from an
//! unavailable backend.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orderbridge_domain::OrderBridgeError;
use serde_json::json;
use tracing::{error, warn};

/// Error wrapper implementing `IntoResponse`.
pub struct ApiError(pub OrderBridgeError);

impl From<OrderBridgeError> for ApiError {
    fn from(err: OrderBridgeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = match &err {
            OrderBridgeError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderBridgeError::Authorization(_) => StatusCode::FORBIDDEN,
            OrderBridgeError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderBridgeError::GatewayTransient(_) => StatusCode::BAD_GATEWAY,
            OrderBridgeError::GatewayRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            OrderBridgeError::Persistence(_)
            | OrderBridgeError::Config(_)
            | OrderBridgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %err, label = err.label(), "request failed");
        } else {
            warn!(error = %err, label = err.label(), "request rejected");
        }

        let mut body = json!({
            "success": false,
            "error": err.to_string(),
            "offline": false,
        });
        if matches!(err, OrderBridgeError::Validation(_)) {
            body["validationError"] = json!(true);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request_with_flag() {
        let response = ApiError(OrderBridgeError::Validation("no items".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn authorization_maps_to_forbidden() {
        let response = ApiError(OrderBridgeError::Authorization("no linkage".into())).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn persistence_maps_to_internal_error() {
        let response = ApiError(OrderBridgeError::Persistence("disk full".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
