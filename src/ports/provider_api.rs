//! Narrow provider-API ports used for enrichment.
//!
//! Each provider exposes a read (and in Google's case, acknowledge) surface
//! of its own API. Parsers call these after verification to augment the
//! canonical event; enrichment failures never fail the surrounding parse,
//! so implementations only need to report faults accurately, not retry.
//!
//! All results are raw JSON: enrichment merges provider responses into the
//! event's metadata without interpreting them beyond a few known fields.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::WebhookError;

/// Apple receipt verification endpoint (`verifyReceipt`).
#[async_trait]
pub trait AppleReceiptApi: Send + Sync {
    /// Verifies a base64 receipt blob and returns Apple's decoded response.
    async fn verify_receipt(&self, receipt_data: &str) -> Result<Value, WebhookError>;
}

/// Google Play Developer API purchase lookups.
#[async_trait]
pub trait GooglePlayApi: Send + Sync {
    /// Fetches a one-time product purchase by token.
    async fn get_product_purchase(
        &self,
        product_id: &str,
        purchase_token: &str,
    ) -> Result<Value, WebhookError>;

    /// Fetches a subscription purchase by token.
    async fn get_subscription_purchase(
        &self,
        subscription_id: &str,
        purchase_token: &str,
    ) -> Result<Value, WebhookError>;

    /// Acknowledges a purchase so Google stops flagging it unacknowledged.
    async fn acknowledge_purchase(
        &self,
        product_id: &str,
        purchase_token: &str,
    ) -> Result<(), WebhookError>;
}

/// PayPal order/subscription lookups over OAuth client-credentials.
#[async_trait]
pub trait PaypalApi: Send + Sync {
    /// Fetches a checkout order by id.
    async fn get_order(&self, order_id: &str) -> Result<Value, WebhookError>;

    /// Fetches a billing subscription by id.
    async fn get_subscription(&self, subscription_id: &str) -> Result<Value, WebhookError>;
}

/// Coinbase Commerce charge lookup.
#[async_trait]
pub trait CoinbaseCommerceApi: Send + Sync {
    /// Fetches a charge by its code.
    async fn get_charge(&self, code: &str) -> Result<Value, WebhookError>;
}

/// WooCommerce REST API order/subscription lookups.
#[async_trait]
pub trait WooCommerceApi: Send + Sync {
    /// Fetches an order, optionally pinning it to its order key.
    async fn get_order(&self, order_id: &str, order_key: Option<&str>)
        -> Result<Value, WebhookError>;

    /// Fetches a subscription by id.
    async fn get_subscription(&self, subscription_id: &str) -> Result<Value, WebhookError>;
}
