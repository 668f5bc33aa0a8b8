//! Google Play Developer API client (androidpublisher v3).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::api_fault;
use crate::domain::errors::WebhookError;
use crate::ports::GooglePlayApi;

const API_BASE: &str = "https://androidpublisher.googleapis.com/androidpublisher/v3";

/// Purchase lookup and acknowledgement against the Play Developer API.
///
/// Authenticates with a pre-issued OAuth bearer token; token refresh is
/// the deployment's concern, not this client's.
pub struct GooglePlayClient {
    client: reqwest::Client,
    package_name: String,
    api_token: SecretString,
}

impl GooglePlayClient {
    pub fn new(package_name: impl Into<String>, api_token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            package_name: package_name.into(),
            api_token,
        }
    }

    fn product_url(&self, product_id: &str, purchase_token: &str) -> String {
        format!(
            "{API_BASE}/applications/{}/purchases/products/{product_id}/tokens/{purchase_token}",
            self.package_name
        )
    }

    fn subscription_url(&self, subscription_id: &str, purchase_token: &str) -> String {
        format!(
            "{API_BASE}/applications/{}/purchases/subscriptions/{subscription_id}/tokens/{purchase_token}",
            self.package_name
        )
    }

    async fn get_json(&self, url: String, context: &str) -> Result<Value, WebhookError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(self.api_token.expose_secret())
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
impl GooglePlayApi for GooglePlayClient {
    async fn get_product_purchase(
        &self,
        product_id: &str,
        purchase_token: &str,
    ) -> Result<Value, WebhookError> {
        self.get_json(
            self.product_url(product_id, purchase_token),
            "google product purchase lookup failed",
        )
        .await
    }

    async fn get_subscription_purchase(
        &self,
        subscription_id: &str,
        purchase_token: &str,
    ) -> Result<Value, WebhookError> {
        self.get_json(
            self.subscription_url(subscription_id, purchase_token),
            "google subscription purchase lookup failed",
        )
        .await
    }

    async fn acknowledge_purchase(
        &self,
        product_id: &str,
        purchase_token: &str,
    ) -> Result<(), WebhookError> {
        let url = format!(
            "{}:acknowledge",
            self.product_url(product_id, purchase_token)
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(self.api_token.expose_secret())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| api_fault("google acknowledge failed", e))?;

        if !response.status().is_success() {
            return Err(api_fault("google acknowledge returned", response.status()));
        }
        tracing::debug!(product_id, "purchase acknowledged");
        Ok(())
    }
}
