//! Coinbase Commerce charge events.
//!
//! Wire shape: `{event: {id, type, data: {code, pricing: {local: {amount,
//! currency}}, metadata, ...}}}`. The charge `code` is the canonical
//! transaction id. Charges are always one-time purchases.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{merge_enrichment, non_empty_transaction_id, require_fields, EventParser};
use crate::domain::errors::WebhookError;
use crate::domain::payment::{PaymentProvider, ProviderEventData, PurchaseStatus};
use crate::domain::providers::amount::decimal_amount;
use crate::ports::CoinbaseCommerceApi;

/// Parser for Coinbase Commerce webhook events.
pub struct CoinbaseParser {
    api: Option<Arc<dyn CoinbaseCommerceApi>>,
}

impl CoinbaseParser {
    pub fn new() -> Self {
        Self { api: None }
    }

    /// Enables charge-lookup enrichment through the Commerce API.
    pub fn with_api(mut self, api: Arc<dyn CoinbaseCommerceApi>) -> Self {
        self.api = Some(api);
        self
    }
}

impl Default for CoinbaseParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventParser for CoinbaseParser {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Coinbase
    }

    fn map_status(&self, event_type: &str) -> PurchaseStatus {
        match event_type {
            "charge:confirmed" | "charge:resolved" => PurchaseStatus::Paid,
            "charge:failed" | "charge:delayed" | "charge:pending" => {
                PurchaseStatus::SentToProcessor
            }
            "charge:created" => PurchaseStatus::SentToWebsocket,
            _ => PurchaseStatus::WebhookReceived,
        }
    }

    async fn parse(&self, payload: &Value) -> Result<ProviderEventData, WebhookError> {
        require_fields(payload, &["event"])?;
        let event = &payload["event"];
        require_fields(event, &["data"])?;
        let charge = &event["data"];
        require_fields(charge, &["code", "pricing"])?;

        let transaction_id = non_empty_transaction_id(
            charge["code"].as_str().unwrap_or_default(),
        )?;
        let amount = decimal_amount(
            charge.pointer("/pricing/local/amount"),
            "pricing.local.amount",
        )?;
        let currency = charge
            .pointer("/pricing/local/currency")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let event_type = event["type"].as_str().unwrap_or_default();
        let status = self.map_status(event_type);

        let user_id = charge
            .pointer("/metadata/user_id")
            .and_then(Value::as_str)
            .map(String::from);

        let mut metadata = Map::new();
        metadata.insert("eventType".to_string(), Value::from(event_type));
        if let Some(event_id) = event["id"].as_str() {
            metadata.insert("eventId".to_string(), Value::from(event_id));
        }
        if let Some(charge_metadata) = charge.get("metadata") {
            metadata.insert("chargeMetadata".to_string(), charge_metadata.clone());
        }

        if let Some(api) = &self.api {
            let lookup = api.get_charge(&transaction_id).await;
            merge_enrichment(&mut metadata, self.provider(), "charge", lookup);
        }

        Ok(ProviderEventData {
            provider: self.provider(),
            transaction_id,
            amount,
            currency,
            status,
            user_id,
            subscription_id: None,
            order_id: None,
            metadata,
        })
    }

    fn item_name(&self, event: &ProviderEventData) -> String {
        event
            .metadata
            .get("charge")
            .and_then(|charge| charge.get("name"))
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| format!("Charge: {}", event.transaction_id))
    }
}
