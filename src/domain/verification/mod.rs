//! Webhook signature verification.
//!
//! One verifier per provider, all behind [`SignatureVerifier`]. The schemes
//! are mutually incompatible (shared-secret HMAC, pinned-algorithm JWT,
//! RSA over a canonical message with a remotely fetched certificate), so
//! the trait exposes only what the dispatcher needs: extract the signature
//! material from the request headers and authenticate the raw body against
//! it. Verification always completes before any parsing or side effect.

mod hmac;
mod jwt;
mod paypal;

pub use self::hmac::HmacVerifier;
pub use self::jwt::{JwtAlgorithm, JwtVerifier};
pub use self::paypal::PaypalSignatureVerifier;

use async_trait::async_trait;

use crate::domain::errors::WebhookError;
use crate::domain::payment::RawWebhookRequest;

/// Authenticates a raw webhook payload against provider-specific signature
/// material.
///
/// Every verifier loads its secret or key exactly once at construction;
/// missing configuration is an assembly-time failure, never a lazy one at
/// request time. Instances are shared across concurrent requests and only
/// perform read-only work.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// Name of the header carrying this provider's signature.
    fn signature_header(&self) -> &'static str;

    /// Extracts the signature token from the request headers.
    ///
    /// An absent or non-UTF-8 header fails with `MissingSignature`.
    fn extract_signature(&self, request: &RawWebhookRequest) -> Result<String, WebhookError> {
        request
            .header(self.signature_header())
            .map(str::to_owned)
            .ok_or(WebhookError::MissingSignature(self.signature_header()))
    }

    /// Verifies the payload against an already-extracted signature.
    ///
    /// Returns `Ok(false)` on cryptographic mismatch; reserves `Err` for
    /// infrastructure faults (`VerificationUnavailable`). Verifiers that
    /// need additional header material (transmission ids, cert URLs) read
    /// it from `request`.
    async fn verify(
        &self,
        request: &RawWebhookRequest,
        signature: &str,
    ) -> Result<bool, WebhookError>;

    /// Extracts and verifies in one step; a mismatch fails `BadSignature`.
    async fn verify_or_fail(&self, request: &RawWebhookRequest) -> Result<(), WebhookError> {
        let signature = self.extract_signature(request)?;
        if self.verify(request, &signature).await? {
            Ok(())
        } else {
            Err(WebhookError::BadSignature)
        }
    }
}
