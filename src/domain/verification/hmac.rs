//! HMAC-SHA256 webhook verification (Coinbase Commerce, CoinSub).
//!
//! Both providers sign the raw request body with a shared secret and send
//! the hex digest in a provider-named header. Comparison is constant-time
//! on the decoded bytes; the hex strings are never compared with `==`.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::SignatureVerifier;
use crate::domain::errors::WebhookError;
use crate::domain::payment::RawWebhookRequest;

/// Shared-secret HMAC-SHA256 verifier.
///
/// The header name and secret are per-instance so one type covers every
/// HMAC provider.
pub struct HmacVerifier {
    header: &'static str,
    secret: SecretString,
}

impl HmacVerifier {
    /// Creates a verifier reading `header` and checking against `secret`.
    pub fn new(header: &'static str, secret: SecretString) -> Self {
        Self { header, secret }
    }

    fn compute_digest(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[async_trait]
impl SignatureVerifier for HmacVerifier {
    fn signature_header(&self) -> &'static str {
        self.header
    }

    async fn verify(
        &self,
        request: &RawWebhookRequest,
        signature: &str,
    ) -> Result<bool, WebhookError> {
        // A signature that is not valid hex can never match
        let claimed = match hex::decode(signature.trim()) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(false),
        };

        let expected = self.compute_digest(&request.body);
        Ok(constant_time_compare(&expected, &claimed))
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes the hex HMAC-SHA256 digest for use in test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}
