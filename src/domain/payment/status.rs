//! Canonical purchase status lifecycle.

use serde::{Deserialize, Serialize};

/// Canonical lifecycle label attached to a payment or subscription event.
///
/// Every provider's event vocabulary maps onto these four values. The
/// progression is not monotonic: a refund legitimately regresses an order
/// from `Paid`. The only guarantee is that every mapping is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Event received and verified; no routing decision made yet.
    WebhookReceived,

    /// Event relayed to a websocket consumer.
    SentToWebsocket,

    /// Event relayed to a downstream processor.
    SentToProcessor,

    /// Payment confirmed by the provider.
    Paid,
}

impl PurchaseStatus {
    /// Returns the canonical lower-snake wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::WebhookReceived => "webhook_received",
            PurchaseStatus::SentToWebsocket => "sent_to_websocket",
            PurchaseStatus::SentToProcessor => "sent_to_processor",
            PurchaseStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
