//! HTTP adapter for the catalog/store collaborator.
//!
//! Expected endpoints on the catalog service:
//! - `GET  /items` - every purchasable item
//! - `GET  /items/resolve?name=<item>` - `{"item_type": "..."}`, 404 for unknown
//! - `POST /orders/<order_id>/status` - `{"status": "..."}`
//! - `GET  /orders?user_id=<id>` - that user's orders

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::errors::WebhookError;
use crate::domain::payment::{AvailableItem, ItemType, PurchaseDetail, PurchaseStatus};
use crate::ports::Catalog;

/// Catalog client configuration.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL of the catalog service, without a trailing slash.
    pub base_url: String,

    /// Request timeout; defaults to 10 seconds.
    pub timeout: Duration,
}

impl CatalogClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP implementation of the `Catalog` port.
pub struct HttpCatalog {
    config: CatalogClientConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    item_type: ItemType,
}

impl HttpCatalog {
    pub fn new(config: CatalogClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

fn fault(context: &str, error: impl std::fmt::Display) -> WebhookError {
    WebhookError::CollaboratorFault(format!("catalog {context}: {error}"))
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn resolve_item_type(&self, name: &str) -> Result<ItemType, WebhookError> {
        let response = self
            .client
            .get(self.url("/items/resolve"))
            .query(&[("name", name)])
            .send()
            .await
            .map_err(|e| fault("resolve request failed", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(ItemType::Unknown);
        }
        if !response.status().is_success() {
            return Err(fault("resolve returned", response.status()));
        }

        let body: ResolveResponse = response
            .json()
            .await
            .map_err(|e| fault("resolve response unparseable", e))?;
        Ok(body.item_type)
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: PurchaseStatus,
    ) -> Result<(), WebhookError> {
        let response = self
            .client
            .post(self.url(&format!("/orders/{order_id}/status")))
            .json(&serde_json::json!({"status": status}))
            .send()
            .await
            .map_err(|e| fault("status update failed", e))?;

        if !response.status().is_success() {
            return Err(fault("status update returned", response.status()));
        }
        tracing::debug!(order_id, status = %status, "order status advanced");
        Ok(())
    }

    async fn list_orders(&self, user_id: &str) -> Result<Vec<PurchaseDetail>, WebhookError> {
        let response = self
            .client
            .get(self.url("/orders"))
            .query(&[("user_id", user_id)])
            .send()
            .await
            .map_err(|e| fault("order list failed", e))?;

        if !response.status().is_success() {
            return Err(fault("order list returned", response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| fault("order list unparseable", e))
    }

    async fn list_items(&self) -> Result<Vec<AvailableItem>, WebhookError> {
        let response = self
            .client
            .get(self.url("/items"))
            .send()
            .await
            .map_err(|e| fault("item list failed", e))?;

        if !response.status().is_success() {
            return Err(fault("item list returned", response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| fault("item list unparseable", e))
    }
}
