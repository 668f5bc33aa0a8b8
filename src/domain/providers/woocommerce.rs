//! WooCommerce webhook notifications.
//!
//! Wire shape: the order (or subscription) object itself — `{id, status,
//! total, currency, customer_id?, order_key?, webhook_event?,
//! line_items: [{product_id, name}]}`. An event whose `webhook_event`
//! starts with `subscription.` is a subscription event; everything else is
//! an order and carries its lifecycle in the `status` field. WooCommerce
//! sends numeric ids; both numbers and strings are accepted.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{merge_enrichment, non_empty_transaction_id, require_fields, EventParser};
use crate::domain::errors::WebhookError;
use crate::domain::payment::{PaymentProvider, ProviderEventData, PurchaseStatus};
use crate::domain::providers::amount::decimal_amount;
use crate::ports::WooCommerceApi;

const SUBSCRIPTION_PREFIX: &str = "subscription.";

/// Parser for WooCommerce webhook events.
pub struct WooCommerceParser {
    api: Option<Arc<dyn WooCommerceApi>>,
}

impl WooCommerceParser {
    pub fn new() -> Self {
        Self { api: None }
    }

    /// Enables order/subscription lookup enrichment through the store's
    /// REST API.
    pub fn with_api(mut self, api: Arc<dyn WooCommerceApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Reads a field WooCommerce serializes as either a number or a string.
    fn scalar_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl Default for WooCommerceParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventParser for WooCommerceParser {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Woocommerce
    }

    fn map_status(&self, event_type: &str) -> PurchaseStatus {
        match event_type {
            "completed" | "processing" | "subscription.created" | "subscription.renewed" => {
                PurchaseStatus::Paid
            }
            "refunded" | "cancelled" | "failed" | "subscription.cancelled"
            | "subscription.expired" | "subscription.suspended" => {
                PurchaseStatus::SentToProcessor
            }
            _ => PurchaseStatus::WebhookReceived,
        }
    }

    async fn parse(&self, payload: &Value) -> Result<ProviderEventData, WebhookError> {
        require_fields(payload, &["id", "total", "currency"])?;

        let transaction_id = non_empty_transaction_id(
            &Self::scalar_string(&payload["id"]).unwrap_or_default(),
        )?;
        let amount = decimal_amount(payload.get("total"), "total")?;
        let currency = payload["currency"].as_str().unwrap_or_default().to_string();

        let webhook_event = payload["webhook_event"].as_str().unwrap_or_default();
        let is_subscription = webhook_event.starts_with(SUBSCRIPTION_PREFIX);

        // Subscription events carry their lifecycle in the event name;
        // order deliveries carry it in the order's own status field
        let order_status = payload["status"].as_str().unwrap_or_default();
        let status = if is_subscription {
            self.map_status(webhook_event)
        } else {
            self.map_status(order_status)
        };

        let mut metadata = Map::new();
        if !webhook_event.is_empty() {
            metadata.insert("webhookEvent".to_string(), Value::from(webhook_event));
        }
        if !order_status.is_empty() {
            metadata.insert("orderStatus".to_string(), Value::from(order_status));
        }
        if let Some(line_item) = payload.pointer("/line_items/0") {
            if let Some(product_id) = Self::scalar_string(&line_item["product_id"]) {
                metadata.insert("productId".to_string(), Value::from(product_id));
            }
            if let Some(name) = line_item["name"].as_str() {
                metadata.insert("lineItemName".to_string(), Value::from(name));
            }
        }

        if let Some(api) = &self.api {
            if is_subscription {
                let lookup = api.get_subscription(&transaction_id).await;
                merge_enrichment(&mut metadata, self.provider(), "subscription", lookup);
            } else {
                let order_key = payload["order_key"].as_str();
                let lookup = api.get_order(&transaction_id, order_key).await;
                merge_enrichment(&mut metadata, self.provider(), "order", lookup);
            }
        }

        Ok(ProviderEventData {
            provider: self.provider(),
            transaction_id: transaction_id.clone(),
            amount,
            currency,
            status,
            user_id: Self::scalar_string(&payload["customer_id"]),
            subscription_id: is_subscription.then(|| transaction_id.clone()),
            order_id: Some(transaction_id),
            metadata,
        })
    }

    fn item_name(&self, event: &ProviderEventData) -> String {
        if let Some(name) = event
            .metadata
            .get("order")
            .and_then(|order| order.pointer("/line_items/0/name"))
            .and_then(Value::as_str)
        {
            return name.to_string();
        }
        if let Some(name) = event.metadata_str("lineItemName") {
            return name.to_string();
        }

        if event.subscription_id.is_some() {
            format!("Subscription: {}", event.transaction_id)
        } else {
            format!("Order: {}", event.transaction_id)
        }
    }
}
