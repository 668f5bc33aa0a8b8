//! The per-request webhook pipeline.
//!
//! One dispatcher instance serves every provider. Each inbound request
//! runs the same strict, sequential state machine:
//!
//! `RECEIVED -> VERIFIED -> PARSED -> CLASSIFIED -> ROUTED -> ACKED`
//!
//! Any failure before routing short-circuits with a typed error and no
//! side effects performed (the failure-tolerant enrichment call inside
//! parsing is the single exception). Routing either relays through the
//! configured forwarder or, when none is configured, selects a registered
//! payment handler by the item category.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use super::classifier::ItemClassifier;
use crate::domain::errors::WebhookError;
use crate::domain::payment::{
    ItemCategory, ItemType, OneTimePaymentData, PaymentProvider, ProviderEventData,
    RawWebhookRequest, SubscriptionPaymentData,
};
use crate::domain::providers::EventParser;
use crate::domain::verification::SignatureVerifier;
use crate::ports::{Catalog, Forwarder, OneTimePaymentHandler, SubscriptionPaymentHandler};

/// Everything provider-specific the pipeline needs, bundled per provider.
///
/// Assembly constructs one bundle per configured provider; the dispatcher
/// itself stays provider-agnostic.
pub struct ProviderStrategy {
    pub verifier: Arc<dyn SignatureVerifier>,
    pub parser: Arc<dyn EventParser>,
}

/// Composes verification, parsing, classification, and routing into one
/// sequential per-request pipeline.
///
/// Receives all dependencies at construction; there is no global registry.
/// Instances are shared across concurrent requests and hold no per-request
/// state.
pub struct WebhookDispatcher {
    strategies: HashMap<PaymentProvider, ProviderStrategy>,
    classifier: ItemClassifier,
    forwarder: Option<Arc<dyn Forwarder>>,
    one_time_handlers: HashMap<ItemCategory, Arc<dyn OneTimePaymentHandler>>,
    subscription_handlers: HashMap<ItemCategory, Arc<dyn SubscriptionPaymentHandler>>,
}

impl WebhookDispatcher {
    /// Creates a dispatcher classifying against `catalog`, with no
    /// providers, forwarder, or handlers registered yet.
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            strategies: HashMap::new(),
            classifier: ItemClassifier::new(catalog),
            forwarder: None,
            one_time_handlers: HashMap::new(),
            subscription_handlers: HashMap::new(),
        }
    }

    /// Registers the strategy bundle for a provider, replacing any
    /// previous registration.
    pub fn register_provider(&mut self, provider: PaymentProvider, strategy: ProviderStrategy) {
        self.strategies.insert(provider, strategy);
    }

    /// Configures the forwarder. Once set, every parsed event is relayed
    /// unconditionally and the handler registries are not consulted.
    pub fn with_forwarder(mut self, forwarder: Arc<dyn Forwarder>) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    /// Registers the one-time payment handler for a category.
    ///
    /// Exactly one handler per category: a second registration fails with
    /// `DuplicateHandler` at assembly time.
    pub fn register_one_time_handler(
        &mut self,
        category: ItemCategory,
        handler: Arc<dyn OneTimePaymentHandler>,
    ) -> Result<(), WebhookError> {
        if self.one_time_handlers.contains_key(&category) {
            return Err(WebhookError::DuplicateHandler(category));
        }
        self.one_time_handlers.insert(category, handler);
        Ok(())
    }

    /// Registers the subscription handler for a category.
    pub fn register_subscription_handler(
        &mut self,
        category: ItemCategory,
        handler: Arc<dyn SubscriptionPaymentHandler>,
    ) -> Result<(), WebhookError> {
        if self.subscription_handlers.contains_key(&category) {
            return Err(WebhookError::DuplicateHandler(category));
        }
        self.subscription_handlers.insert(category, handler);
        Ok(())
    }

    /// Runs the full pipeline for one inbound request.
    pub async fn dispatch(
        &self,
        provider: PaymentProvider,
        request: &RawWebhookRequest,
    ) -> Result<(), WebhookError> {
        let strategy = self.strategies.get(&provider).ok_or_else(|| {
            WebhookError::UnroutableEvent(format!("provider {provider} is not configured"))
        })?;
        tracing::debug!(provider = %provider, stage = "received", "webhook accepted");

        strategy.verifier.verify_or_fail(request).await.map_err(|error| {
            tracing::warn!(provider = %provider, error = %error, "verification failed");
            error
        })?;
        tracing::debug!(provider = %provider, stage = "verified", "signature verified");

        let payload: Value = serde_json::from_slice(&request.body)
            .map_err(|e| WebhookError::Parse(format!("body is not valid JSON: {e}")))?;
        let event = strategy.parser.parse(&payload).await?;
        tracing::debug!(
            provider = %provider,
            stage = "parsed",
            transaction_id = %event.transaction_id,
            status = %event.status,
            "event normalized"
        );

        let item_name = strategy.parser.item_name(&event);
        let item_type = self.classifier.classify(&item_name).await?;
        tracing::debug!(provider = %provider, stage = "classified", item_type = %item_type, "event classified");

        self.route(&event, &item_name, item_type).await?;
        tracing::debug!(provider = %provider, stage = "acked", "pipeline complete");
        Ok(())
    }

    async fn route(
        &self,
        event: &ProviderEventData,
        item_name: &str,
        item_type: ItemType,
    ) -> Result<(), WebhookError> {
        // A configured forwarder takes every event, classified or not
        if let Some(forwarder) = &self.forwarder {
            return forwarder.forward_event(event).await;
        }

        match item_type {
            ItemType::OneTimePayment => {
                let category = ItemCategory::one_time();
                let handler = self
                    .one_time_handlers
                    .get(&category)
                    .ok_or_else(|| WebhookError::NoHandlerRegistered(category.clone()))?;
                handler
                    .handle(one_time_record(event, category, item_name))
                    .await
            }
            ItemType::Subscription => {
                let category = ItemCategory::subscription();
                let handler = self
                    .subscription_handlers
                    .get(&category)
                    .ok_or_else(|| WebhookError::NoHandlerRegistered(category.clone()))?;
                handler
                    .handle(subscription_record(event, category, item_name))
                    .await
            }
            ItemType::Unknown => Err(WebhookError::UnroutableEvent(format!(
                "item '{item_name}' is unknown and no forwarder is configured"
            ))),
        }
    }
}

fn one_time_record(
    event: &ProviderEventData,
    category: ItemCategory,
    item_name: &str,
) -> OneTimePaymentData {
    OneTimePaymentData {
        user_id: event.user_id.clone().unwrap_or_default(),
        item_category: category,
        purchase_id: event.transaction_id.clone(),
        item_name: item_name.to_string(),
        time_bought: Utc::now(),
        status: event.status,
        quantity: 1,
        metadata: event.metadata.clone(),
    }
}

fn subscription_record(
    event: &ProviderEventData,
    category: ItemCategory,
    item_name: &str,
) -> SubscriptionPaymentData {
    SubscriptionPaymentData {
        user_id: event.user_id.clone().unwrap_or_default(),
        item_category: category,
        purchase_id: event.transaction_id.clone(),
        item_name: item_name.to_string(),
        time_bought: Utc::now(),
        status: event.status,
        metadata: event.metadata.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderMap;
    use hmac::{Hmac, Mac};
    use secrecy::SecretString;
    use sha2::Sha256;
    use std::sync::Mutex;

    use crate::domain::payment::{AvailableItem, PurchaseDetail, PurchaseStatus};
    use crate::domain::providers::CoinbaseParser;
    use crate::domain::verification::HmacVerifier;

    const TEST_SECRET: &str = "cc_webhook_shared_secret";
    const SIGNATURE_HEADER: &str = "X-CC-Webhook-Signature";

    // ══════════════════════════════════════════════════════════════
    // Mock Collaborators
    // ══════════════════════════════════════════════════════════════

    struct MockCatalog {
        answer: ItemType,
        calls: Mutex<Vec<String>>,
    }

    impl MockCatalog {
        fn resolving(answer: ItemType) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Catalog for MockCatalog {
        async fn resolve_item_type(&self, name: &str) -> Result<ItemType, WebhookError> {
            self.calls.lock().unwrap().push(format!("resolve:{name}"));
            Ok(self.answer)
        }

        async fn update_order_status(
            &self,
            order_id: &str,
            status: PurchaseStatus,
        ) -> Result<(), WebhookError> {
            self.calls.lock().unwrap().push(format!("status:{order_id}:{status}"));
            Ok(())
        }

        async fn list_orders(&self, _user_id: &str) -> Result<Vec<PurchaseDetail>, WebhookError> {
            Ok(vec![])
        }

        async fn list_items(&self) -> Result<Vec<AvailableItem>, WebhookError> {
            Ok(vec![])
        }
    }

    struct RecordingOneTimeHandler {
        received: Mutex<Vec<OneTimePaymentData>>,
    }

    impl RecordingOneTimeHandler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                received: Mutex::new(Vec::new()),
            })
        }
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

    impl RecordingSubscriptionHandler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                received: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SubscriptionPaymentHandler for RecordingSubscriptionHandler {
        async fn handle(&self, payment: SubscriptionPaymentData) -> Result<(), WebhookError> {
            self.received.lock().unwrap().push(payment);
            Ok(())
        }
    }

    struct RecordingForwarder {
        relayed: Mutex<Vec<ProviderEventData>>,
    }

    impl RecordingForwarder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                relayed: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Forwarder for RecordingForwarder {
        async fn forward_event(&self, event: &ProviderEventData) -> Result<(), WebhookError> {
            self.relayed.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Fixtures
    // ══════════════════════════════════════════════════════════════

    fn coinbase_strategy() -> ProviderStrategy {
        ProviderStrategy {
            verifier: Arc::new(HmacVerifier::new(
                SIGNATURE_HEADER,
                SecretString::new(TEST_SECRET.to_string()),
            )),
            parser: Arc::new(CoinbaseParser::new()),
        }
    }

    fn confirmed_charge_body() -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "event": {
                "id": "evt-1",
                "type": "charge:confirmed",
                "data": {
                    "code": "CHARGE1",
                    "pricing": {"local": {"amount": "9.99", "currency": "USD"}},
                    "metadata": {"user_id": "user-1"}
                }
            }
        }))
        .unwrap()
    }

    fn signed_request(body: Vec<u8>) -> RawWebhookRequest {
        let mut mac = Hmac::<Sha256>::new_from_slice(TEST_SECRET.as_bytes()).unwrap();
        mac.update(&body);
        let signature = hex::encode(mac.finalize().into_bytes());

        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, signature.parse().unwrap());
        RawWebhookRequest::new(headers, body)
    }

    fn dispatcher_with(catalog: Arc<MockCatalog>) -> WebhookDispatcher {
        let mut dispatcher = WebhookDispatcher::new(catalog);
        dispatcher.register_provider(PaymentProvider::Coinbase, coinbase_strategy());
        dispatcher
    }

    // ══════════════════════════════════════════════════════════════
    // Pipeline Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn confirmed_charge_reaches_one_time_handler() {
        // Scenario: crypto-charge "confirmed", no forwarder, catalog says one-time
        let catalog = MockCatalog::resolving(ItemType::OneTimePayment);
        let mut dispatcher = dispatcher_with(catalog.clone());
        let handler = RecordingOneTimeHandler::new();
        dispatcher
            .register_one_time_handler(ItemCategory::one_time(), handler.clone())
            .unwrap();

        dispatcher
            .dispatch(PaymentProvider::Coinbase, &signed_request(confirmed_charge_body()))
            .await
            .unwrap();

        let received = handler.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].status, PurchaseStatus::Paid);
        assert_eq!(received[0].quantity, 1);
        assert_eq!(received[0].user_id, "user-1");
        assert_eq!(received[0].purchase_id, "CHARGE1");
        assert_eq!(received[0].item_name, "Charge: CHARGE1");
    }

    #[tokio::test]
    async fn subscription_classification_selects_subscription_handler() {
        let catalog = MockCatalog::resolving(ItemType::Subscription);
        let mut dispatcher = dispatcher_with(catalog);
        let handler = RecordingSubscriptionHandler::new();
        dispatcher
            .register_subscription_handler(ItemCategory::subscription(), handler.clone())
            .unwrap();

        dispatcher
            .dispatch(PaymentProvider::Coinbase, &signed_request(confirmed_charge_body()))
            .await
            .unwrap();

        assert_eq!(handler.received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bad_signature_short_circuits_before_any_side_effect() {
        let catalog = MockCatalog::resolving(ItemType::OneTimePayment);
        let mut dispatcher = dispatcher_with(catalog.clone());
        let handler = RecordingOneTimeHandler::new();
        dispatcher
            .register_one_time_handler(ItemCategory::one_time(), handler.clone())
            .unwrap();

        let mut request = signed_request(confirmed_charge_body());
        request.body.push(b' '); // invalidates the signature

        let err = dispatcher
            .dispatch(PaymentProvider::Coinbase, &request)
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::BadSignature));
        assert!(catalog.calls.lock().unwrap().is_empty());
        assert!(handler.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_json_is_parse_error_with_no_side_effects() {
        let catalog = MockCatalog::resolving(ItemType::OneTimePayment);
        let dispatcher = dispatcher_with(catalog.clone());

        let err = dispatcher
            .dispatch(
                PaymentProvider::Coinbase,
                &signed_request(b"this is not json".to_vec()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::Parse(_)));
        assert!(catalog.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn forwarder_takes_every_event_unconditionally() {
        let catalog = MockCatalog::resolving(ItemType::Unknown);
        let forwarder = RecordingForwarder::new();
        let mut dispatcher =
            WebhookDispatcher::new(catalog).with_forwarder(forwarder.clone());
        dispatcher.register_provider(PaymentProvider::Coinbase, coinbase_strategy());

        dispatcher
            .dispatch(PaymentProvider::Coinbase, &signed_request(confirmed_charge_body()))
            .await
            .unwrap();

        let relayed = forwarder.relayed.lock().unwrap();
        assert_eq!(relayed.len(), 1);
        assert_eq!(relayed[0].transaction_id, "CHARGE1");
    }

    #[tokio::test]
    async fn unknown_item_without_forwarder_is_unroutable() {
        let catalog = MockCatalog::resolving(ItemType::Unknown);
        let dispatcher = dispatcher_with(catalog);

        let err = dispatcher
            .dispatch(PaymentProvider::Coinbase, &signed_request(confirmed_charge_body()))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::UnroutableEvent(_)));
    }

    #[tokio::test]
    async fn missing_handler_registration_fails_explicitly() {
        let catalog = MockCatalog::resolving(ItemType::OneTimePayment);
        let dispatcher = dispatcher_with(catalog);

        let err = dispatcher
            .dispatch(PaymentProvider::Coinbase, &signed_request(confirmed_charge_body()))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::NoHandlerRegistered(_)));
    }

    #[tokio::test]
    async fn unconfigured_provider_is_unroutable() {
        let catalog = MockCatalog::resolving(ItemType::OneTimePayment);
        let dispatcher = dispatcher_with(catalog);

        let err = dispatcher
            .dispatch(PaymentProvider::Apple, &signed_request(confirmed_charge_body()))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::UnroutableEvent(_)));
    }

    #[test]
    fn duplicate_handler_registration_is_rejected() {
        let catalog = MockCatalog::resolving(ItemType::OneTimePayment);
        let mut dispatcher = WebhookDispatcher::new(catalog);

        dispatcher
            .register_one_time_handler(ItemCategory::one_time(), RecordingOneTimeHandler::new())
            .unwrap();
        let err = dispatcher
            .register_one_time_handler(ItemCategory::one_time(), RecordingOneTimeHandler::new())
            .unwrap_err();

        assert!(matches!(err, WebhookError::DuplicateHandler(_)));
    }
}
