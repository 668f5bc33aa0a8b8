//! Google Play real-time developer notifications.
//!
//! Wire shape: `{message: {data: {...}}}` where `data` carries either a
//! `subscriptionNotification` or a `oneTimeProductNotification`. Pub/Sub
//! deliveries base64-encode `data`; both the encoded and the plain-object
//! form are accepted. Amounts arrive as integer micros. Numeric RTDN
//! notification codes are translated to their canonical token strings at
//! the parser edge so the status map stays string-keyed like every other
//! provider's.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Value};

use super::{merge_enrichment, non_empty_transaction_id, require_fields, EventParser};
use crate::domain::errors::WebhookError;
use crate::domain::payment::{PaymentProvider, ProviderEventData, PurchaseStatus};
use crate::domain::providers::amount::micros_amount;
use crate::ports::GooglePlayApi;

/// Parser for Google Play webhook notifications.
pub struct GoogleParser {
    api: Option<Arc<dyn GooglePlayApi>>,
}

impl GoogleParser {
    pub fn new() -> Self {
        Self { api: None }
    }

    /// Enables purchase-lookup enrichment (and acknowledgement) through
    /// the Play Developer API.
    pub fn with_api(mut self, api: Arc<dyn GooglePlayApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Decodes `message.data`, which Pub/Sub may deliver base64-encoded.
    fn decode_data(data: &Value) -> Result<Value, WebhookError> {
        match data {
            Value::String(encoded) => {
                let bytes = BASE64
                    .decode(encoded.trim())
                    .map_err(|e| WebhookError::Parse(format!("message.data is not base64: {e}")))?;
                serde_json::from_slice(&bytes)
                    .map_err(|e| WebhookError::Parse(format!("message.data is not JSON: {e}")))
            }
            other => Ok(other.clone()),
        }
    }

    /// Translates a numeric RTDN code to its canonical token.
    ///
    /// Unknown codes keep their numeric form as a string; the status map's
    /// totality turns them into `webhook_received`.
    fn notification_token(code: &Value, subscription: bool) -> String {
        let numeric = match code {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        };

        let Some(numeric) = numeric else {
            return code.as_str().unwrap_or_default().to_string();
        };

        let token = if subscription {
            match numeric {
                1 => "SUBSCRIPTION_RECOVERED",
                2 => "SUBSCRIPTION_RENEWED",
                3 => "SUBSCRIPTION_CANCELED",
                4 => "SUBSCRIPTION_PURCHASED",
                5 => "SUBSCRIPTION_ON_HOLD",
                6 => "SUBSCRIPTION_IN_GRACE_PERIOD",
                7 => "SUBSCRIPTION_RESTARTED",
                8 => "SUBSCRIPTION_PRICE_CHANGE_CONFIRMED",
                9 => "SUBSCRIPTION_DEFERRED",
                10 => "SUBSCRIPTION_PAUSED",
                11 => "SUBSCRIPTION_PAUSE_SCHEDULE_CHANGED",
                12 => "SUBSCRIPTION_REVOKED",
                13 => "SUBSCRIPTION_EXPIRED",
                _ => return numeric.to_string(),
            }
        } else {
            match numeric {
                1 => "ONE_TIME_PRODUCT_PURCHASED",
                2 => "ONE_TIME_PRODUCT_CANCELED",
                _ => return numeric.to_string(),
            }
        };
        token.to_string()
    }

    async fn enrich(
        &self,
        metadata: &mut Map<String, Value>,
        subscription: bool,
        item_id: &str,
        purchase_token: &str,
    ) {
        let Some(api) = &self.api else { return };

        let lookup = if subscription {
            api.get_subscription_purchase(item_id, purchase_token).await
        } else {
            api.get_product_purchase(item_id, purchase_token).await
        };

        let unacknowledged = lookup
            .as_ref()
            .ok()
            .and_then(|purchase| purchase.get("acknowledgementState"))
            .and_then(Value::as_i64)
            == Some(0);

        merge_enrichment(metadata, self.provider(), "purchase", lookup);

        if unacknowledged {
            if let Err(error) = api.acknowledge_purchase(item_id, purchase_token).await {
                tracing::warn!(
                    provider = "google",
                    error = %error,
                    "purchase acknowledgement failed"
                );
            }
        }
    }
}

impl Default for GoogleParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventParser for GoogleParser {
    fn provider(&self) -> PaymentProvider {
        PaymentProvider::Google
    }

    fn map_status(&self, event_type: &str) -> PurchaseStatus {
        match event_type {
            "SUBSCRIPTION_PURCHASED" | "SUBSCRIPTION_RENEWED" | "SUBSCRIPTION_RESTARTED"
            | "ONE_TIME_PRODUCT_PURCHASED" => PurchaseStatus::Paid,
            "SUBSCRIPTION_CANCELED"
            | "SUBSCRIPTION_ON_HOLD"
            | "SUBSCRIPTION_IN_GRACE_PERIOD"
            | "SUBSCRIPTION_PRICE_CHANGE_CONFIRMED"
            | "SUBSCRIPTION_DEFERRED"
            | "SUBSCRIPTION_PAUSED"
            | "SUBSCRIPTION_PAUSE_SCHEDULE_CHANGED"
            | "SUBSCRIPTION_EXPIRED"
            | "ONE_TIME_PRODUCT_CANCELED" => PurchaseStatus::SentToProcessor,
            _ => PurchaseStatus::WebhookReceived,
        }
    }

    async fn parse(&self, payload: &Value) -> Result<ProviderEventData, WebhookError> {
        require_fields(payload, &["message"])?;
        require_fields(&payload["message"], &["data"])?;
        let data = Self::decode_data(&payload["message"]["data"])?;

        let (notification, is_subscription) = match (
            data.get("subscriptionNotification"),
            data.get("oneTimeProductNotification"),
        ) {
            (Some(n), _) => (n, true),
            (None, Some(n)) => (n, false),
            (None, None) => {
                return Err(WebhookError::MissingFields(vec![
                    "subscriptionNotification",
                ]))
            }
        };

        require_fields(
            notification,
            &[
                "orderId",
                "priceAmountMicros",
                "priceCurrencyCode",
                "notificationType",
            ],
        )?;

        let transaction_id = non_empty_transaction_id(
            notification["orderId"].as_str().unwrap_or_default(),
        )?;
        let amount = micros_amount(
            notification.get("priceAmountMicros"),
            "priceAmountMicros",
        )?;
        let currency = notification["priceCurrencyCode"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        let token =
            Self::notification_token(&notification["notificationType"], is_subscription);
        let status = self.map_status(&token);

        let item_id_field = if is_subscription { "subscriptionId" } else { "productId" };
        let item_id = notification[item_id_field].as_str().map(String::from);

        let mut metadata = Map::new();
        metadata.insert("notificationType".to_string(), Value::from(token.as_str()));
        if let Some(package_name) = data["packageName"].as_str() {
            metadata.insert("packageName".to_string(), Value::from(package_name));
        }
        if let Some(payload) = data["developerPayload"].as_str() {
            metadata.insert("developerPayload".to_string(), Value::from(payload));
        }
        if let Some(ref id) = item_id {
            metadata.insert(item_id_field.to_string(), Value::from(id.as_str()));
        }

        if let (Some(item_id), Some(purchase_token)) =
            (item_id.as_deref(), notification["purchaseToken"].as_str())
        {
            self.enrich(&mut metadata, is_subscription, item_id, purchase_token)
                .await;
        }

        Ok(ProviderEventData {
            provider: self.provider(),
            transaction_id,
            amount,
            currency,
            status,
            user_id: data["userId"].as_str().map(String::from),
            subscription_id: is_subscription.then(|| item_id.clone()).flatten(),
            order_id: None,
            metadata,
        })
    }

    fn item_name(&self, event: &ProviderEventData) -> String {
        if let Some(title) = event
            .metadata
            .get("purchase")
            .and_then(|purchase| purchase.get("title"))
            .and_then(Value::as_str)
        {
            return title.to_string();
        }

        if let Some(subscription_id) = &event.subscription_id {
            format!("Subscription: {subscription_id}")
        } else {
            let product_id = event
                .metadata_str("productId")
                .unwrap_or(&event.transaction_id);
            format!("Product: {product_id}")
        }
    }
}
