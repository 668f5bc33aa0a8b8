//! Coinbase Commerce charge lookup client.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::api_fault;
use crate::domain::errors::WebhookError;
use crate::ports::CoinbaseCommerceApi;

const API_BASE: &str = "https://api.commerce.coinbase.com";
const API_VERSION: &str = "2018-03-22";

/// Fetches charges from Coinbase Commerce by charge code.
pub struct CoinbaseCommerceClient {
    client: reqwest::Client,
    api_key: SecretString,
}

impl CoinbaseCommerceClient {
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }
}

#[async_trait]
impl CoinbaseCommerceApi for CoinbaseCommerceClient {
    async fn get_charge(&self, code: &str) -> Result<Value, WebhookError> {
        let response = self
            .client
            .get(format!("{API_BASE}/charges/{code}"))
            .header("X-CC-Api-Key", self.api_key.expose_secret())
            .header("X-CC-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| api_fault("coinbase charge lookup failed", e))?;

        if !response.status().is_success() {
            return Err(api_fault("coinbase charge lookup returned", response.status()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| api_fault("coinbase charge response unparseable", e))?;

        // The Commerce API wraps every resource in a `data` envelope
        Ok(body.get("data").cloned().unwrap_or(body))
    }
}
