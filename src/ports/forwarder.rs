//! Downstream relay port.

use async_trait::async_trait;

use crate::domain::errors::WebhookError;
use crate::domain::payment::ProviderEventData;

/// Port for relaying canonical events to a downstream consumer.
///
/// A forwarder advances the order's persisted status in the catalog and
/// then delivers the event to its sink. The status write strictly precedes
/// the relay: a relay failure leaves status already advanced, and the
/// provider's redelivery (which forwarders must treat as safe) closes the
/// gap. This at-least-once, non-atomic behavior is deliberate.
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Writes the forwarder's status for the event's order reference, then
    /// relays the canonical event JSON to the sink.
    async fn forward_event(&self, event: &ProviderEventData) -> Result<(), WebhookError>;
}
