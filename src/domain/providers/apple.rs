//! Apple App Store server notifications.
//!
//! Wire shape: `{notification_type, environment, user_id?, latest_receipt?,
//! unified_receipt: {latest_receipt_info: [{transaction_id, price,
//! currency, product_id, expires_date?, ...}]}}`. The first receipt entry
//! is canonical; a receipt with `expires_date` is a subscription.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{merge_enrichment, non_empty_transaction_id, require_fields, EventParser};
use crate::domain::errors::WebhookError;
use crate::domain::payment::{PaymentProvider, ProviderEventData, PurchaseStatus};
use crate::domain::providers::amount::decimal_amount;
use crate::ports::AppleReceiptApi;

/// Parser for App Store server notifications.
pub struct AppleParser {
    api: Option<Arc<dyn AppleReceiptApi>>,
}

impl AppleParser {
    pub fn new() -> Self {
        Self { api: None }
    }

    /// Enables receipt-verification enrichment against `verifyReceipt`.
    pub fn with_api(mut self, api: Arc<dyn AppleReceiptApi>) -> Self {
        self.api = Some(api);
        self
    }
}

impl Default for AppleParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventParser for AppleParser {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Apple
    }

    fn map_status(&self, event_type: &str) -> PurchaseStatus {
        match event_type {
            "INITIAL_BUY" | "DID_RENEW" | "INTERACTIVE_RENEWAL" => PurchaseStatus::Paid,
            "CANCEL" | "REFUND" | "REVOKE" | "DID_CHANGE_RENEWAL_PREF"
            | "DID_CHANGE_RENEWAL_STATUS" | "PRICE_INCREASE_CONSENT"
            | "CONSUMPTION_REQUEST" => PurchaseStatus::SentToProcessor,
            _ => PurchaseStatus::WebhookReceived,
        }
    }

    async fn parse(&self, payload: &Value) -> Result<ProviderEventData, WebhookError> {
        let receipt = payload
            .pointer("/unified_receipt/latest_receipt_info/0")
            .ok_or_else(|| {
                WebhookError::MissingFields(vec!["unified_receipt.latest_receipt_info"])
            })?;
        require_fields(receipt, &["transaction_id", "price", "currency"])?;

        let transaction_id = non_empty_transaction_id(
            receipt["transaction_id"].as_str().unwrap_or_default(),
        )?;
        let amount = decimal_amount(receipt.get("price"), "price")?;
        let currency = receipt["currency"].as_str().unwrap_or_default().to_string();

        let notification_type = payload["notification_type"].as_str().unwrap_or_default();
        let status = self.map_status(notification_type);

        // Receipts carrying an expiry are subscription renewals
        let is_subscription = !matches!(receipt.get("expires_date"), None | Some(Value::Null));
        let subscription_id = is_subscription.then(|| {
            receipt["original_transaction_id"]
                .as_str()
                .unwrap_or(&transaction_id)
                .to_string()
        });

        let mut metadata = Map::new();
        metadata.insert("notificationType".to_string(), Value::from(notification_type));
        if let Some(environment) = payload["environment"].as_str() {
            metadata.insert("environment".to_string(), Value::from(environment));
        }
        if let Some(product_id) = receipt["product_id"].as_str() {
            metadata.insert("productId".to_string(), Value::from(product_id));
        }
        if let Some(expires) = receipt["expires_date"].as_str() {
            metadata.insert("expiresDate".to_string(), Value::from(expires));
        }

        if let Some(api) = &self.api {
            if let Some(latest_receipt) = payload["latest_receipt"].as_str() {
                let verification = api.verify_receipt(latest_receipt).await;
                merge_enrichment(&mut metadata, self.provider(), "receipt", verification);
            }
        }

        Ok(ProviderEventData {
            provider: self.provider(),
            transaction_id,
            amount,
            currency,
            status,
            user_id: payload["user_id"].as_str().map(String::from),
            subscription_id,
            order_id: None,
            metadata,
        })
    }

    fn item_name(&self, event: &ProviderEventData) -> String {
        let product_id = event
            .metadata
            .get("receipt")
            .and_then(|receipt| receipt.pointer("/receipt/in_app/0/product_id"))
            .and_then(Value::as_str)
            .or_else(|| event.metadata_str("productId"));

        match (product_id, event.subscription_id.is_some()) {
            (Some(id), true) => format!("Subscription: {id}"),
            (Some(id), false) => format!("Product: {id}"),
            (None, true) => format!("Subscription: {}", event.transaction_id),
            (None, false) => format!("Product: {}", event.transaction_id),
        }
    }
}
