//! Locally registered payment handler ports.
//!
//! When no forwarder is configured, the dispatcher routes classified events
//! to these handlers, selected by the canonical record's item category.
//! Exactly one handler per category may be registered.

use async_trait::async_trait;

use crate::domain::errors::WebhookError;
use crate::domain::payment::{OneTimePaymentData, SubscriptionPaymentData};

/// Handler for one-time (non-recurring) purchases.
#[async_trait]
pub trait OneTimePaymentHandler: Send + Sync {
    /// Processes a canonical one-time payment record.
    ///
    /// Providers redeliver webhooks, so implementations must tolerate
    /// receiving the same `purchase_id` more than once.
    async fn handle(&self, payment: OneTimePaymentData) -> Result<(), WebhookError>;
}

/// Handler for recurring subscription events.
#[async_trait]
pub trait SubscriptionPaymentHandler: Send + Sync {
    /// Processes a canonical subscription record.
    ///
    /// Must tolerate repeated delivery of the same `purchase_id`.
    async fn handle(&self, payment: SubscriptionPaymentData) -> Result<(), WebhookError>;
}
