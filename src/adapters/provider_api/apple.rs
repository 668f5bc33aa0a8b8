//! Apple `verifyReceipt` client.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::api_fault;
use crate::domain::errors::WebhookError;
use crate::ports::AppleReceiptApi;

const PRODUCTION_URL: &str = "https://buy.itunes.apple.com/verifyReceipt";
const SANDBOX_URL: &str = "https://sandbox.itunes.apple.com/verifyReceipt";

/// Status Apple returns when a sandbox receipt hits the production endpoint.
const STATUS_SANDBOX_RECEIPT: i64 = 21007;

/// Verifies receipts against Apple, falling back to the sandbox endpoint
/// when Apple reports the receipt came from a sandbox environment.
pub struct AppleReceiptClient {
    client: reqwest::Client,
    shared_secret: Option<SecretString>,
}

impl AppleReceiptClient {
    pub fn new(shared_secret: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            shared_secret,
        }
    }

    fn request_body(&self, receipt_data: &str) -> Value {
        let mut body = serde_json::json!({ "receipt-data": receipt_data });
        if let Some(secret) = &self.shared_secret {
            body["password"] = Value::String(secret.expose_secret().clone());
        }
        body
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value, WebhookError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| api_fault("apple verifyReceipt request failed", e))?;

        if !response.status().is_success() {
            return Err(api_fault("apple verifyReceipt returned", response.status()));
        }

        response
            .json()
            .await
            .map_err(|e| api_fault("apple verifyReceipt response unparseable", e))
    }
}

#[async_trait]
impl AppleReceiptApi for AppleReceiptClient {
    async fn verify_receipt(&self, receipt_data: &str) -> Result<Value, WebhookError> {
        let body = self.request_body(receipt_data);

        let result = self.post(PRODUCTION_URL, &body).await?;
        if result.get("status").and_then(Value::as_i64) == Some(STATUS_SANDBOX_RECEIPT) {
            tracing::debug!("sandbox receipt, retrying against sandbox endpoint");
            return self.post(SANDBOX_URL, &body).await;
        }
        Ok(result)
    }
}
