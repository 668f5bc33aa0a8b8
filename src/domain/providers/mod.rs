//! Per-provider event parsing and status mapping.
//!
//! Each provider module supplies one [`EventParser`]: a total status map
//! over the provider's event vocabulary, a batched required-field check,
//! amount normalization, optional enrichment through the provider's own
//! verification API, and item-name derivation. Parsers run strictly after
//! signature verification and are pure apart from the enrichment call.

mod amount;
mod apple;
mod coinbase;
mod coinsub;
mod google;
mod paypal;
mod woocommerce;

pub use amount::{decimal_amount, micros_amount};
pub use apple::AppleParser;
pub use coinbase::CoinbaseParser;
pub use coinsub::CoinsubParser;
pub use google::GoogleParser;
pub use paypal::PaypalParser;
pub use woocommerce::WooCommerceParser;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::errors::WebhookError;
use crate::domain::payment::{PaymentProvider, ProviderEventData, PurchaseStatus};

/// Normalizes a provider's verified payload into a canonical event.
#[async_trait]
pub trait EventParser: Send + Sync {
    /// The provider this parser handles.
    fn provider(&self) -> PaymentProvider;

    /// Maps a provider event/notification string to a canonical status.
    ///
    /// Total by contract: unrecognized input maps to
    /// `PurchaseStatus::WebhookReceived`, never an error.
    fn map_status(&self, event_type: &str) -> PurchaseStatus;

    /// Parses the payload into a canonical event, running the enrichment
    /// call when one is configured.
    ///
    /// Required-field violations are reported in one batch naming every
    /// missing field. Enrichment failures degrade into
    /// `metadata.verificationError` and never fail the parse.
    async fn parse(&self, payload: &Value) -> Result<ProviderEventData, WebhookError>;

    /// Derives the item name for catalog classification.
    ///
    /// Prefers enrichment data in the event metadata and falls back to a
    /// deterministic provider-specific string; never fails.
    fn item_name(&self, event: &ProviderEventData) -> String;
}

/// Returns the subset of `fields` absent (or null) on `value`.
///
/// Used by every parser's required-field check so violations come back in
/// one batch instead of failing on the first.
pub(crate) fn missing_fields(value: &Value, fields: &[&'static str]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|field| matches!(value.get(**field), None | Some(Value::Null)))
        .copied()
        .collect()
}

/// Fails with `MissingFields` when any of `fields` is absent on `value`.
pub(crate) fn require_fields(value: &Value, fields: &[&'static str]) -> Result<(), WebhookError> {
    let missing = missing_fields(value, fields);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(WebhookError::MissingFields(missing))
    }
}

/// Merges an enrichment result into the metadata bag.
///
/// Success lands under `key`; failure is recorded as
/// `verificationError` and the parse continues with best-effort data.
pub(crate) fn merge_enrichment(
    metadata: &mut Map<String, Value>,
    provider: PaymentProvider,
    key: &str,
    result: Result<Value, WebhookError>,
) {
    match result {
        Ok(value) => {
            metadata.insert(key.to_string(), value);
        }
        Err(error) => {
            tracing::warn!(
                provider = %provider,
                error = %error,
                "enrichment call failed, continuing with best-effort data"
            );
            metadata.insert(
                "verificationError".to_string(),
                Value::String(error.to_string()),
            );
        }
    }
}

/// Fails with `Validation` when a parsed transaction id is empty.
pub(crate) fn non_empty_transaction_id(id: &str) -> Result<String, WebhookError> {
    if id.is_empty() {
        Err(WebhookError::Validation(
            "transaction id is empty".to_string(),
        ))
    } else {
        Ok(id.to_string())
    }
}
