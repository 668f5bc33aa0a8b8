//! Certificate fetch port for RSA webhook verification.

use async_trait::async_trait;

use crate::domain::errors::WebhookError;

/// Port for fetching signature-verification certificates by URL.
///
/// PayPal delivers the URL of its signing certificate with every webhook;
/// verification needs the PEM bytes behind it. Fetch failures are
/// infrastructure faults and surface as `VerificationUnavailable` so the
/// provider redelivers.
#[async_trait]
pub trait CertificateSource: Send + Sync {
    /// Returns the PEM-encoded certificate at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, WebhookError>;
}
