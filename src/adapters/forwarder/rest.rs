//! REST forwarder: relays events to a payment processor over HTTP.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::WebhookError;
use crate::domain::payment::{ProviderEventData, PurchaseStatus};
use crate::ports::{Catalog, Forwarder};

pub const DEFAULT_PROCESSOR_ROUTE: &str = "/creditor_api";

/// Forwards events to a downstream processor as JSON POSTs.
///
/// Marks the order `sent_to_processor` before attempting delivery.
pub struct RestForwarder {
    catalog: Arc<dyn Catalog>,
    client: reqwest::Client,
    base_url: String,
    route: String,
}

impl RestForwarder {
    pub fn new(catalog: Arc<dyn Catalog>, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            catalog,
            client,
            base_url: base_url.into(),
            route: DEFAULT_PROCESSOR_ROUTE.to_string(),
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.route)
    }
}

#[async_trait]
impl Forwarder for RestForwarder {
    async fn forward_event(&self, event: &ProviderEventData) -> Result<(), WebhookError> {
        self.catalog
            .update_order_status(&event.order_reference(), PurchaseStatus::SentToProcessor)
            .await?;

        let response = self
            .client
            .post(self.endpoint())
            .json(event)
            .send()
            .await
            .map_err(|e| {
                WebhookError::CollaboratorFault(format!("processor relay failed: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(WebhookError::CollaboratorFault(format!(
                "processor returned {}",
                response.status()
            )));
        }

        tracing::info!(
            provider = %event.provider,
            transaction_id = %event.transaction_id,
            "event relayed to processor"
        );
        Ok(())
    }
}
