//! PayPal REST API client with OAuth client-credentials token caching.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::api_fault;
use crate::domain::errors::WebhookError;
use crate::ports::PaypalApi;

const LIVE_BASE: &str = "https://api-m.paypal.com";
const SANDBOX_BASE: &str = "https://api-m.sandbox.paypal.com";

/// Tokens are refreshed this long before PayPal's stated expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Order and subscription lookups against the PayPal REST API.
pub struct PaypalClient {
    client: reqwest::Client,
    base_url: &'static str,
    client_id: String,
    client_secret: SecretString,
    token: RwLock<Option<CachedToken>>,
}

impl PaypalClient {
    pub fn new(client_id: impl Into<String>, client_secret: SecretString, sandbox: bool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: if sandbox { SANDBOX_BASE } else { LIVE_BASE },
            client_id: client_id.into(),
            client_secret,
            token: RwLock::new(None),
        }
    }

    async fn access_token(&self) -> Result<String, WebhookError> {
        if let Some(cached) = self.token.read().await.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.access_token.clone());
            }
        }

        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| api_fault("paypal token request failed", e))?;

        if !response.status().is_success() {
            return Err(api_fault("paypal token endpoint returned", response.status()));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| api_fault("paypal token response unparseable", e))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        *self.token.write().await = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        tracing::debug!(expires_in = token.expires_in, "paypal access token refreshed");

        Ok(token.access_token)
    }

    async fn get_json(&self, path: &str, context: &str) -> Result<Value, WebhookError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(token)
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
impl PaypalApi for PaypalClient {
    async fn get_order(&self, order_id: &str) -> Result<Value, WebhookError> {
        self.get_json(
            &format!("/v2/checkout/orders/{order_id}"),
            "paypal order lookup failed",
        )
        .await
    }

    async fn get_subscription(&self, subscription_id: &str) -> Result<Value, WebhookError> {
        self.get_json(
            &format!("/v1/billing/subscriptions/{subscription_id}"),
            "paypal subscription lookup failed",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_flag_selects_base_url() {
        let sandbox = PaypalClient::new("id", SecretString::new("s".to_string()), true);
        assert_eq!(sandbox.base_url, "https://api-m.sandbox.paypal.com");

        let live = PaypalClient::new("id", SecretString::new("s".to_string()), false);
        assert_eq!(live.base_url, "https://api-m.paypal.com");
    }

    #[tokio::test]
    async fn cached_token_is_reused_until_expiry() {
        let client = PaypalClient::new("id", SecretString::new("s".to_string()), true);
        *client.token.write().await = Some(CachedToken {
            access_token: "cached-token".to_string(),
            expires_at: Instant::now() + Duration::from_secs(300),
        });

        // No network call happens: the cached token is still fresh
        assert_eq!(client.access_token().await.unwrap(), "cached-token");
    }
}
