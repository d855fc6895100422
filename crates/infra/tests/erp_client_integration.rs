//! Integration coverage for the ERP gateway client against a mock server.

use orderbridge_core::ErpGateway;
use orderbridge_domain::{ErpConfig, GatewayErrorCategory, OrderItem, OrderPayload};
use orderbridge_infra::ErpClient;
use serde_json::json;
use wiremock::matchers::{body_json_string, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload() -> OrderPayload {
    OrderPayload {
        partner: 42,
        items: vec![OrderItem { sku: "SKU-1".into(), qty: 2, price: 10.0 }],
        total: 20.0,
    }
}

fn client_for(server: &MockServer, token: Option<&str>) -> ErpClient {
    ErpClient::from_config(&ErpConfig {
        base_url: server.uri(),
        api_token: token.map(str::to_string),
        timeout_seconds: 5,
    })
    .expect("erp client")
}

#[tokio::test]
async fn create_order_returns_order_reference() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("Idempotency-Key", "key-123"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "orderRef": 9001 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let order_ref = client.create_order(&payload(), "key-123").await.expect("order created");
    assert_eq!(order_ref, 9001);
}

#[tokio::test]
async fn create_order_sends_bearer_token_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(header("Authorization", "Bearer secret-token"))
        .and(header_exists("Idempotency-Key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "orderRef": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("secret-token"));
    client.create_order(&payload(), "key-abc").await.expect("order created");
}

#[tokio::test]
async fn create_order_posts_the_payload_verbatim() {
    let server = MockServer::start().await;
    let expected =
        serde_json::to_string(&payload()).expect("payload should serialize");
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .and(body_json_string(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "orderRef": 5 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    client.create_order(&payload(), "key-verbatim").await.expect("order created");
}

#[tokio::test]
async fn server_errors_classify_as_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance window"))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client.create_order(&payload(), "key-503").await.expect_err("must fail");
    assert_eq!(err.category(), GatewayErrorCategory::ServerUnavailable);
    assert!(err.is_retryable());
    assert_eq!(err.context(), Some("maintenance window"));
}

#[tokio::test]
async fn validation_rejections_are_not_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(422).set_body_string("unknown partner"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let err = client.create_order(&payload(), "key-422").await.expect_err("must fail");
    assert_eq!(err.category(), GatewayErrorCategory::Validation);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn auth_failures_classify_as_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("expired"));
    let err = client.create_order(&payload(), "key-401").await.expect_err("must fail");
    assert_eq!(err.category(), GatewayErrorCategory::Authentication);
}

#[tokio::test]
async fn unreachable_server_classifies_as_offline() {
    let client = ErpClient::from_config(&ErpConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        api_token: None,
        timeout_seconds: 2,
    })
    .expect("erp client");

    let err = client.create_order(&payload(), "key-down").await.expect_err("must fail");
    assert_eq!(err.category(), GatewayErrorCategory::NetworkOffline);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn health_check_reflects_endpoint_status() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    client.check_health().await.expect("healthy");
}
