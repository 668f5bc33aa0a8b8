//! Remote certificate retrieval with an in-memory cache.
//!
//! PayPal signs each webhook delivery with a key whose certificate is
//! served from a URL named in the delivery headers. Certificates rotate
//! rarely, so fetched PEM bytes are cached per URL for the process
//! lifetime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::WebhookError;
use crate::ports::CertificateSource;

/// Fetches certificates over HTTPS, caching the raw bytes per URL.
pub struct HttpCertificateSource {
    client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl HttpCertificateSource {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of cached certificates, for diagnostics.
    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}

impl Default for HttpCertificateSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CertificateSource for HttpCertificateSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, WebhookError> {
        if let Some(cached) = self.cache.read().await.get(url) {
            return Ok(cached.clone());
        }

        let response = self.client.get(url).send().await.map_err(|e| {
            WebhookError::VerificationUnavailable(format!("certificate fetch failed: {e}"))
        })?;

        if !response.status().is_success() {
            return Err(WebhookError::VerificationUnavailable(format!(
                "certificate endpoint returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| {
                WebhookError::VerificationUnavailable(format!("certificate body unreadable: {e}"))
            })?
            .to_vec();

        tracing::debug!(url, bytes = bytes.len(), "certificate fetched and cached");
        self.cache
            .write()
            .await
            .insert(url.to_string(), bytes.clone());

        Ok(bytes)
    }
}
