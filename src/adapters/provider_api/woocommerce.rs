//! WooCommerce REST API client (basic auth with consumer credentials).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::api_fault;
use crate::domain::errors::WebhookError;
use crate::ports::WooCommerceApi;

const API_PREFIX: &str = "/wp-json/wc/v3";

/// Order and subscription lookups against a WooCommerce store.
pub struct WooCommerceClient {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: SecretString,
}

impl WooCommerceClient {
    pub fn new(
        base_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: SecretString,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            consumer_key: consumer_key.into(),
            consumer_secret,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<Value, WebhookError> {
        let response = self
            .client
            .get(self.url(path))
            .basic_auth(&self.consumer_key, Some(self.consumer_secret.expose_secret()))
            .query(query)
            .send()
            .await
            .map_err(|e| api_fault(context, e))?;

        if !response.status().is_success() {
            return Err(api_fault(context, response.status()));
        }

        response.json().await.map_err(|e| api_fault(context, e))
    }
}

#[async_trait]
impl WooCommerceApi for WooCommerceClient {
    async fn get_order(
        &self,
        order_id: &str,
        order_key: Option<&str>,
    ) -> Result<Value, WebhookError> {
        let query: Vec<(&str, &str)> = order_key.map(|key| ("order_key", key)).into_iter().collect();
        self.get_json(
            &format!("/orders/{order_id}"),
            &query,
            "woocommerce order lookup failed",
        )
        .await
    }

    async fn get_subscription(&self, subscription_id: &str) -> Result<Value, WebhookError> {
        self.get_json(
            &format!("/subscriptions/{subscription_id}"),
            &[],
            "woocommerce subscription lookup failed",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WooCommerceClient {
        WooCommerceClient::new(
            "https://shop.example.com/",
            "ck_test",
            SecretString::new("cs_test".to_string()),
        )
    }

    #[test]
    fn url_joins_under_api_prefix() {
        assert_eq!(
            client().url("/orders/1234"),
            "https://shop.example.com/wp-json/wc/v3/orders/1234"
        );
    }

    #[tokio::test]
    async fn unreachable_store_is_retryable() {
        let client = WooCommerceClient::new(
            "http://127.0.0.1:1",
            "ck_test",
            SecretString::new("cs_test".to_string()),
        );

        let err = client.get_order("1234", None).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
