//! CoinSub subscription events.
//!
//! Wire shape: `{event_type, subscription: {transaction_id, amount,
//! currency, status, user_id, subscription_id}}`. Every CoinSub event is a
//! subscription event; there is no enrichment API.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{non_empty_transaction_id, require_fields, EventParser};
use crate::domain::errors::WebhookError;
use crate::domain::payment::{PaymentProvider, ProviderEventData, PurchaseStatus};
use crate::domain::providers::amount::decimal_amount;

/// Parser for CoinSub webhook events.
pub struct CoinsubParser;

impl CoinsubParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinsubParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventParser for CoinsubParser {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Coinsub
    }

    fn map_status(&self, event_type: &str) -> PurchaseStatus {
        match event_type {
            "subscription_activated" | "subscription_renewed" => PurchaseStatus::Paid,
            "subscription_canceled" | "subscription_expired" => PurchaseStatus::SentToProcessor,
            _ => PurchaseStatus::WebhookReceived,
        }
    }

    async fn parse(&self, payload: &Value) -> Result<ProviderEventData, WebhookError> {
        require_fields(payload, &["subscription"])?;
        let subscription = &payload["subscription"];
        require_fields(
            subscription,
            &["transaction_id", "amount", "currency", "status"],
        )?;

        let transaction_id = non_empty_transaction_id(
            subscription["transaction_id"].as_str().unwrap_or_default(),
        )?;
        let amount = decimal_amount(subscription.get("amount"), "amount")?;
        let currency = subscription["currency"].as_str().unwrap_or_default().to_string();

        let event_type = payload["event_type"].as_str().unwrap_or_default();
        let status = self.map_status(event_type);

        let mut metadata = Map::new();
        metadata.insert("eventType".to_string(), Value::from(event_type));
        metadata.insert(
            "subscriptionStatus".to_string(),
            subscription["status"].clone(),
        );

        Ok(ProviderEventData {
            provider: self.provider(),
            transaction_id,
            amount,
            currency,
            status,
            user_id: subscription["user_id"].as_str().map(String::from),
            subscription_id: subscription["subscription_id"].as_str().map(String::from),
            order_id: None,
            metadata,
        })
    }

    fn item_name(&self, event: &ProviderEventData) -> String {
        let id = event
            .subscription_id
            .as_deref()
            .unwrap_or(&event.transaction_id);
        format!("Subscription: {id}")
    }
}
