//! Inbound request envelope and the canonical event produced from it.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::provider::PaymentProvider;
use super::status::PurchaseStatus;

/// Raw inbound webhook request: header map plus unparsed body bytes.
///
/// Created per call and discarded once the pipeline finishes; nothing in
/// the crate holds onto one.
#[derive(Debug, Clone)]
pub struct RawWebhookRequest {
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawWebhookRequest {
    pub fn new(headers: HeaderMap, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Returns a header value as UTF-8, if present and well-formed.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Canonical event normalized out of a provider's wire format.
///
/// `transaction_id` is guaranteed non-empty after a successful parse.
/// Provider extras and enrichment results live in `metadata`; canonical
/// fields are never overwritten by enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEventData {
    pub provider: PaymentProvider,

    pub transaction_id: String,

    /// Amount in major currency units, normalized from the provider's
    /// representation (decimal strings or integer micros).
    pub amount: f64,

    pub currency: String,

    pub status: PurchaseStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    /// Free-form provider extras plus enrichment results.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ProviderEventData {
    /// The identifier used for catalog status writes during forwarding.
    ///
    /// Prefers the explicit order id and falls back to the transaction id.
    pub fn order_reference(&self) -> &str {
        self.order_id.as_deref().unwrap_or(&self.transaction_id)
    }

    /// Reads a metadata entry as a string, if present.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}
