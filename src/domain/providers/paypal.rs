//! PayPal webhook events.
//!
//! Wire shape: `{id, event_type, resource: {...}}`. Events whose type
//! starts with `BILLING.SUBSCRIPTION` are subscription events; everything
//! else is treated as a one-time order/capture. The amount lives either at
//! `resource.amount` or, for billing events, under
//! `resource.billing_info.last_payment.amount`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{merge_enrichment, non_empty_transaction_id, require_fields, EventParser};
use crate::domain::errors::WebhookError;
use crate::domain::payment::{PaymentProvider, ProviderEventData, PurchaseStatus};
use crate::domain::providers::amount::decimal_amount;
use crate::ports::PaypalApi;

const SUBSCRIPTION_PREFIX: &str = "BILLING.SUBSCRIPTION";

/// Parser for PayPal webhook events.
pub struct PaypalParser {
    api: Option<Arc<dyn PaypalApi>>,
}

impl PaypalParser {
    pub fn new() -> Self {
        Self { api: None }
    }

    /// Enables order/subscription lookup enrichment through PayPal's API.
    pub fn with_api(mut self, api: Arc<dyn PaypalApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Extracts `(amount, currency)` from whichever shape the event carries.
    ///
    /// An event carrying neither amount shape is tolerated as zero with no
    /// currency; a present but non-numeric amount still fails validation.
    fn extract_amount(resource: &Value) -> Result<(f64, String), WebhookError> {
        for path in ["/amount", "/billing_info/last_payment/amount"] {
            if let Some(amount) = resource.pointer(path) {
                let value = decimal_amount(amount.get("value"), "amount.value")?;
                let currency = amount["currency_code"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                return Ok((value, currency));
            }
        }
        Ok((0.0, String::new()))
    }
}

impl Default for PaypalParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventParser for PaypalParser {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Paypal
    }

    fn map_status(&self, event_type: &str) -> PurchaseStatus {
        match event_type {
            "PAYMENT.CAPTURE.COMPLETED"
            | "PAYMENT.SALE.COMPLETED"
            | "BILLING.SUBSCRIPTION.ACTIVATED"
            | "BILLING.SUBSCRIPTION.RENEWED" => PurchaseStatus::Paid,
            "PAYMENT.CAPTURE.PENDING"
            | "PAYMENT.SALE.PENDING"
            | "PAYMENT.CAPTURE.DENIED"
            | "PAYMENT.SALE.DENIED"
            | "BILLING.SUBSCRIPTION.SUSPENDED"
            | "BILLING.SUBSCRIPTION.CANCELLED"
            | "BILLING.SUBSCRIPTION.EXPIRED" => PurchaseStatus::SentToProcessor,
            "CHECKOUT.ORDER.APPROVED" | "BILLING.SUBSCRIPTION.CREATED" => {
                PurchaseStatus::SentToWebsocket
            }
            _ => PurchaseStatus::WebhookReceived,
        }
    }

    async fn parse(&self, payload: &Value) -> Result<ProviderEventData, WebhookError> {
        require_fields(payload, &["event_type", "resource"])?;
        let resource = &payload["resource"];
        require_fields(resource, &["id"])?;

        let transaction_id =
            non_empty_transaction_id(resource["id"].as_str().unwrap_or_default())?;
        let event_type = payload["event_type"].as_str().unwrap_or_default();
        let is_subscription = event_type.starts_with(SUBSCRIPTION_PREFIX);

        let (amount, currency) = Self::extract_amount(resource)?;
        let status = self.map_status(event_type);

        let order_id = resource["order_id"]
            .as_str()
            .unwrap_or(&transaction_id)
            .to_string();

        let mut metadata = Map::new();
        metadata.insert("eventType".to_string(), Value::from(event_type));
        if let Some(webhook_event_id) = payload["id"].as_str() {
            metadata.insert("webhookEventId".to_string(), Value::from(webhook_event_id));
        }
        if let Some(plan_id) = resource["plan_id"].as_str() {
            metadata.insert("planId".to_string(), Value::from(plan_id));
        }

        if let Some(api) = &self.api {
            if is_subscription {
                let lookup = api.get_subscription(&transaction_id).await;
                merge_enrichment(&mut metadata, self.provider(), "subscription", lookup);
            } else {
                let lookup = api.get_order(&order_id).await;
                merge_enrichment(&mut metadata, self.provider(), "order", lookup);
            }
        }

        Ok(ProviderEventData {
            provider: self.provider(),
            transaction_id: transaction_id.clone(),
            amount,
            currency,
            status,
            user_id: resource["custom_id"].as_str().map(String::from),
            subscription_id: is_subscription.then(|| transaction_id.clone()),
            order_id: Some(order_id),
            metadata,
        })
    }

    fn item_name(&self, event: &ProviderEventData) -> String {
        if let Some(description) = event
            .metadata
            .get("order")
            .and_then(|order| order.pointer("/purchase_units/0/description"))
            .and_then(Value::as_str)
        {
            return description.to_string();
        }
        if let Some(plan_id) = event
            .metadata
            .get("subscription")
            .and_then(|subscription| subscription.get("plan_id"))
            .and_then(Value::as_str)
        {
            return format!("Subscription: {plan_id}");
        }

        if let Some(subscription_id) = &event.subscription_id {
            format!("Subscription: {subscription_id}")
        } else {
            format!("Order: {}", event.order_reference())
        }
    }
}
