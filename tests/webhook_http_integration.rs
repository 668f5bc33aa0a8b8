//! Integration tests for the webhook HTTP surface.
//!
//! These tests drive the full axum router with real verifiers and parsers,
//! mocking only the external collaborators (catalog, payment handlers):
//! 1. Signed webhooks flow end to end into a registered handler
//! 2. Rejections carry the right status code and error envelope
//! 3. Store endpoints read through to the catalog

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::{json, Value};
use sha2::Sha256;
use tower::ServiceExt;

use paygate::adapters::http::{webhook_router, WebhookAppState};
use paygate::application::{ProviderStrategy, WebhookDispatcher};
use paygate::domain::errors::WebhookError;
use paygate::domain::payment::{
    AvailableItem, ItemCategory, ItemType, OneTimePaymentData, PaymentProvider, PurchaseDetail,
    PurchaseStatus, SubscriptionPaymentData,
};
use paygate::domain::providers::{AppleParser, CoinbaseParser, WooCommerceParser};
use paygate::domain::verification::{HmacVerifier, JwtAlgorithm, JwtVerifier};
use paygate::ports::{Catalog, OneTimePaymentHandler, SubscriptionPaymentHandler};

const COINBASE_SECRET: &str = "cb-webhook-secret";
const WOOCOMMERCE_SECRET: &str = "wc-webhook-secret";
const ES256_PRIVATE: &str = include_str!("../src/domain/verification/testdata/es256_private.pem");
const ES256_PUBLIC: &str = include_str!("../src/domain/verification/testdata/es256_public.pem");

// =============================================================================
// Test Infrastructure
// =============================================================================

/// In-memory catalog standing in for the store service.
struct MockCatalog {
    items: Vec<AvailableItem>,
    status_writes: Mutex<Vec<(String, PurchaseStatus)>>,
}

impl MockCatalog {
    fn new() -> Self {
        Self {
            items: vec![
                AvailableItem {
                    name: "Premium Pack".to_string(),
                    item_type: ItemType::OneTimePayment,
                    category: ItemCategory::one_time(),
                    price: 9.99,
                    currency: "USD".to_string(),
                },
                AvailableItem {
                    name: "Monthly Plan".to_string(),
                    item_type: ItemType::Subscription,
                    category: ItemCategory::subscription(),
                    price: 4.99,
                    currency: "USD".to_string(),
                },
            ],
            status_writes: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn resolve_item_type(&self, name: &str) -> Result<ItemType, WebhookError> {
        // Charges without a catalog-listed name still sell as one-time items
        if name.starts_with("Charge:") {
            return Ok(ItemType::OneTimePayment);
        }
        Ok(self
            .items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.item_type)
            .unwrap_or(ItemType::Unknown))
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: PurchaseStatus,
    ) -> Result<(), WebhookError> {
        self.status_writes
            .lock()
            .unwrap()
            .push((order_id.to_string(), status));
        Ok(())
    }

    async fn list_orders(&self, user_id: &str) -> Result<Vec<PurchaseDetail>, WebhookError> {
        Ok(vec![PurchaseDetail {
            order_id: "ord-1".to_string(),
            user_id: user_id.to_string(),
            item_name: "Premium Pack".to_string(),
            item_category: ItemCategory::one_time(),
            quantity: Some(1),
            time_bought: "2024-06-01T12:00:00Z".to_string(),
            status: PurchaseStatus::Paid,
            provider: "coinbase".to_string(),
        }])
    }

    async fn list_items(&self) -> Result<Vec<AvailableItem>, WebhookError> {
        Ok(self.items.clone())
    }
}

/// Records every one-time payment it is handed.
struct RecordingOneTimeHandler {
    received: Mutex<Vec<OneTimePaymentData>>,
}

#[async_trait]
impl OneTimePaymentHandler for RecordingOneTimeHandler {
    async fn handle(&self, payment: OneTimePaymentData) -> Result<(), WebhookError> {
        self.received.lock().unwrap().push(payment);
        Ok(())
    }
}

struct RecordingSubscriptionHandler {
    received: Mutex<Vec<SubscriptionPaymentData>>,
}

#[async_trait]
impl SubscriptionPaymentHandler for RecordingSubscriptionHandler {
    async fn handle(&self, payment: SubscriptionPaymentData) -> Result<(), WebhookError> {
        self.received.lock().unwrap().push(payment);
        Ok(())
    }
}

struct TestHarness {
    state: WebhookAppState,
    one_time: Arc<RecordingOneTimeHandler>,
    subscription: Arc<RecordingSubscriptionHandler>,
}

/// Coinbase, Apple, and WooCommerce wired with real verifiers; no
/// forwarder, so routing goes through the handler registries.
fn build_harness() -> TestHarness {
    let catalog = Arc::new(MockCatalog::new());
    let mut dispatcher = WebhookDispatcher::new(catalog.clone());

    dispatcher.register_provider(
        PaymentProvider::Coinbase,
        ProviderStrategy {
            verifier: Arc::new(HmacVerifier::new(
                "X-CC-Webhook-Signature",
                SecretString::new(COINBASE_SECRET.to_string()),
            )),
            parser: Arc::new(CoinbaseParser::new()),
        },
    );

    dispatcher.register_provider(
        PaymentProvider::Apple,
        ProviderStrategy {
            verifier: Arc::new(
                JwtVerifier::new("Signature", JwtAlgorithm::Es256, ES256_PUBLIC.as_bytes())
                    .unwrap(),
            ),
            parser: Arc::new(AppleParser::new()),
        },
    );

    dispatcher.register_provider(
        PaymentProvider::Woocommerce,
        ProviderStrategy {
            verifier: Arc::new(HmacVerifier::new(
                "X-WC-Webhook-Signature",
                SecretString::new(WOOCOMMERCE_SECRET.to_string()),
            )),
            parser: Arc::new(WooCommerceParser::new()),
        },
    );

    let one_time = Arc::new(RecordingOneTimeHandler {
        received: Mutex::new(Vec::new()),
    });
    let subscription = Arc::new(RecordingSubscriptionHandler {
        received: Mutex::new(Vec::new()),
    });
    dispatcher
        .register_one_time_handler(ItemCategory::one_time(), one_time.clone())
        .unwrap();
    dispatcher
        .register_subscription_handler(ItemCategory::subscription(), subscription.clone())
        .unwrap();

    TestHarness {
        state: WebhookAppState {
            dispatcher: Arc::new(dispatcher),
            catalog,
        },
        one_time,
        subscription,
    }
}

fn sign_coinbase(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(COINBASE_SECRET.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

fn sign_woocommerce(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WOOCOMMERCE_SECRET.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[derive(Serialize)]
struct NotificationClaims {
    iss: &'static str,
}

fn sign_apple() -> String {
    let key = jsonwebtoken::EncodingKey::from_ec_pem(ES256_PRIVATE.as_bytes()).unwrap();
    let header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::ES256);
    jsonwebtoken::encode(&header, &NotificationClaims { iss: "appstore" }, &key).unwrap()
}

fn coinbase_body() -> Vec<u8> {
    json!({
        "event": {
            "id": "evt-1",
            "type": "charge:confirmed",
            "data": {
                "code": "CHARGE-42",
                "pricing": {"local": {"amount": "9.99", "currency": "USD"}},
                "metadata": {"user_id": "user-7"}
            }
        }
    })
    .to_string()
    .into_bytes()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Webhook Flow
// =============================================================================

#[tokio::test]
async fn signed_coinbase_webhook_reaches_one_time_handler() {
    let harness = build_harness();
    let app = webhook_router().with_state(harness.state.clone());

    let body = coinbase_body();
    let signature = sign_coinbase(&body);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/coinbase")
                .header("X-CC-Webhook-Signature", signature)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "success");

    let received = harness.one_time.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].purchase_id, "CHARGE-42");
    assert_eq!(received[0].user_id, "user-7");
    assert_eq!(received[0].status, PurchaseStatus::Paid);
    assert_eq!(received[0].quantity, 1);
    assert_eq!(received[0].item_name, "Charge: CHARGE-42");
    assert!(harness.subscription.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn signed_woocommerce_order_reaches_one_time_handler() {
    let harness = build_harness();
    let app = webhook_router().with_state(harness.state.clone());

    let body = json!({
        "id": 1234,
        "status": "completed",
        "total": "9.99",
        "currency": "USD",
        "customer_id": "user-wc",
        "line_items": [{"product_id": 789, "name": "Premium Pack"}]
    })
    .to_string()
    .into_bytes();
    let signature = sign_woocommerce(&body);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/woocommerce")
                .header("X-WC-Webhook-Signature", signature)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "success");

    let received = harness.one_time.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].purchase_id, "1234");
    assert_eq!(received[0].user_id, "user-wc");
    assert_eq!(received[0].status, PurchaseStatus::Paid);
    assert_eq!(received[0].item_name, "Premium Pack");
}

#[tokio::test]
async fn tampered_coinbase_body_is_rejected_without_side_effects() {
    let harness = build_harness();
    let app = webhook_router().with_state(harness.state.clone());

    let body = coinbase_body();
    let signature = sign_coinbase(&body);
    let mut tampered = body.clone();
    tampered[10] ^= 1;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/coinbase")
                .header("X-CC-Webhook-Signature", signature)
                .body(Body::from(tampered))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "Signature verification failed");

    assert!(harness.one_time.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_signature_header_names_the_header() {
    let harness = build_harness();
    let app = webhook_router().with_state(harness.state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/coinbase")
                .body(Body::from(coinbase_body()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("X-CC-Webhook-Signature"));
}

#[tokio::test]
async fn verified_apple_payload_missing_fields_is_bad_request() {
    let harness = build_harness();
    let app = webhook_router().with_state(harness.state.clone());

    // Validly signed, but the receipt carries no transaction_id
    let body = json!({
        "notification_type": "INITIAL_BUY",
        "unified_receipt": {
            "latest_receipt_info": [{
                "price": "0.99",
                "currency": "USD"
            }]
        }
    })
    .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/apple")
                .header("Signature", sign_apple())
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["status"], "error");
    assert!(json["message"].as_str().unwrap().contains("transaction_id"));

    assert!(harness.one_time.received.lock().unwrap().is_empty());
    assert!(harness.subscription.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unconfigured_provider_is_rejected() {
    let harness = build_harness();
    let app = webhook_router().with_state(harness.state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/paypal")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("paypal"));
}

#[tokio::test]
async fn invalid_json_after_valid_signature_is_parse_error() {
    let harness = build_harness();
    let app = webhook_router().with_state(harness.state);

    let body = b"not json at all".to_vec();
    let signature = sign_coinbase(&body);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/coinbase")
                .header("X-CC-Webhook-Signature", signature)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("JSON"));
}

// =============================================================================
// Store Endpoints
// =============================================================================

#[tokio::test]
async fn store_items_are_grouped_by_type() {
    let harness = build_harness();
    let app = webhook_router().with_state(harness.state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/store/items")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["one_time_payment"][0]["name"], "Premium Pack");
    assert_eq!(json["subscription"][0]["name"], "Monthly Plan");
}

#[tokio::test]
async fn store_orders_require_user_id() {
    let harness = build_harness();
    let app = webhook_router().with_state(harness.state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/store/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("user_id"));
}

#[tokio::test]
async fn store_orders_list_for_user() {
    let harness = build_harness();
    let app = webhook_router().with_state(harness.state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/store/orders?user_id=user-7")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["orders"][0]["user_id"], "user-7");
    assert_eq!(json["orders"][0]["status"], "paid");
}
