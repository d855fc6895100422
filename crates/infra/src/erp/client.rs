//! HTTP client for the ERP order API.
//!
//! Every create call carries the submission's idempotency key, so an
//! ambiguous timeout can be retried without risking a duplicate order.

use std::time::Duration;

use async_trait::async_trait;
use orderbridge_core::ErpGateway;
use orderbridge_domain::{ErpConfig, GatewayError, OrderPayload};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::HttpClient;

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// ERP gateway over HTTP.
pub struct ErpClient {
    http: HttpClient,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderResponse {
    order_ref: i64,
}

impl ErpClient {
    /// Build a client from the ERP section of the configuration.
    ///
    /// Transport-level retries are enabled: the idempotency key on every
    /// request makes a repeated POST safe.
    pub fn from_config(config: &ErpConfig) -> Result<Self, GatewayError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("orderbridge")
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Probe the ERP health endpoint. Used at startup and by the sync worker
    /// to cheaply detect connectivity before draining a batch.
    pub async fn check_health(&self) -> Result<(), GatewayError> {
        let url = format!("{}/health", self.base_url);
        let mut request = self.http.request(Method::HEAD, &url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = self.http.send(request).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(GatewayError::from_status(status.as_u16(), "health probe failed"))
        }
    }
}

#[async_trait]
impl ErpGateway for ErpClient {
    #[instrument(skip(self, payload), fields(partner = payload.partner))]
    async fn create_order(
        &self,
        payload: &OrderPayload,
        idempotency_key: &str,
    ) -> Result<i64, GatewayError> {
        let url = format!("{}/api/orders", self.base_url);
        let mut request = self
            .http
            .request(Method::POST, &url)
            .header(IDEMPOTENCY_HEADER, idempotency_key)
            .json(payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = self.http.send(request).await?;
        let status = response.status();

        if !status.is_success() {
            let reason =
                status.canonical_reason().unwrap_or("order creation rejected").to_string();
            let body = response.text().await.unwrap_or_default();
            let mut err = GatewayError::from_status(status.as_u16(), &reason);
            if !body.is_empty() {
                err = err.with_context(truncate_body(&body));
            }
            return Err(err);
        }

        let created: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::unknown(format!("malformed order response: {e}")))?;

        debug!(order_ref = created.order_ref, "order created");
        Ok(created.order_ref)
    }
}

/// Keep response bodies in errors bounded so logs stay readable.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 512;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
