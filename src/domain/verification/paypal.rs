//! PayPal webhook verification (RSA-PKCS1-SHA256 with remote certificate).
//!
//! PayPal signs a canonical message rather than the raw body:
//! `transmission_id|transmission_time|webhook_id|event_body`, pipe-joined
//! with the body spliced in as raw UTF-8. The webhook id is pinned from
//! configuration and never read from the request. The signing certificate
//! is fetched from the URL PayPal supplies with each delivery, through the
//! `CertificateSource` port.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha2::Sha256;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

use super::SignatureVerifier;
use crate::domain::errors::WebhookError;
use crate::domain::payment::RawWebhookRequest;
use crate::ports::CertificateSource;

const SIGNATURE_HEADER: &str = "paypal-transmission-sig";
const TRANSMISSION_ID_HEADER: &str = "paypal-transmission-id";
const TRANSMISSION_TIME_HEADER: &str = "paypal-transmission-time";
const CERT_URL_HEADER: &str = "paypal-cert-url";
const AUTH_ALGO_HEADER: &str = "paypal-auth-algo";

/// The only auth-algorithm string PayPal documents for webhook signatures.
const EXPECTED_AUTH_ALGO: &str = "SHA256withRSA";

/// RSA verifier for PayPal transmission signatures.
pub struct PaypalSignatureVerifier {
    webhook_id: String,
    cert_source: Arc<dyn CertificateSource>,
}

impl PaypalSignatureVerifier {
    /// Creates a verifier pinned to the configured webhook id.
    pub fn new(webhook_id: impl Into<String>, cert_source: Arc<dyn CertificateSource>) -> Self {
        Self {
            webhook_id: webhook_id.into(),
            cert_source,
        }
    }

    fn canonical_message(&self, transmission_id: &str, timestamp: &str, body: &[u8]) -> Vec<u8> {
        let mut message = Vec::with_capacity(
            transmission_id.len() + timestamp.len() + self.webhook_id.len() + body.len() + 3,
        );
        message.extend_from_slice(transmission_id.as_bytes());
        message.push(b'|');
        message.extend_from_slice(timestamp.as_bytes());
        message.push(b'|');
        message.extend_from_slice(self.webhook_id.as_bytes());
        message.push(b'|');
        message.extend_from_slice(body);
        message
    }

    fn public_key_from_pem(pem: &[u8]) -> Result<RsaPublicKey, WebhookError> {
        // The certificate comes from PayPal's own infrastructure; failing to
        // parse it is an infrastructure fault, not a client error
        let certificate = Certificate::from_pem(pem).map_err(|e| {
            WebhookError::VerificationUnavailable(format!("unparseable certificate: {e}"))
        })?;

        let spki_der = certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| {
                WebhookError::VerificationUnavailable(format!("unreadable public key: {e}"))
            })?;

        RsaPublicKey::from_public_key_der(&spki_der).map_err(|e| {
            WebhookError::VerificationUnavailable(format!("certificate key is not RSA: {e}"))
        })
    }

    fn required_header<'a>(
        request: &'a RawWebhookRequest,
        name: &'static str,
    ) -> Result<&'a str, WebhookError> {
        request.header(name).ok_or(WebhookError::MissingSignature(name))
    }
}

#[async_trait]
impl SignatureVerifier for PaypalSignatureVerifier {
    fn signature_header(&self) -> &'static str {
        SIGNATURE_HEADER
    }

    async fn verify(
        &self,
        request: &RawWebhookRequest,
        signature: &str,
    ) -> Result<bool, WebhookError> {
        let transmission_id = Self::required_header(request, TRANSMISSION_ID_HEADER)?;
        let timestamp = Self::required_header(request, TRANSMISSION_TIME_HEADER)?;
        let cert_url = Self::required_header(request, CERT_URL_HEADER)?;
        let auth_algo = Self::required_header(request, AUTH_ALGO_HEADER)?;

        if auth_algo != EXPECTED_AUTH_ALGO {
            tracing::warn!(provider = "paypal", auth_algo, "unsupported auth algorithm");
            return Ok(false);
        }

        let signature_bytes = match BASE64.decode(signature.trim()) {
            Ok(bytes) => bytes,
            Err(_) => return Ok(false),
        };
        let signature = match Signature::try_from(signature_bytes.as_slice()) {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };

        let pem = self.cert_source.fetch(cert_url).await?;
        let public_key = Self::public_key_from_pem(&pem)?;
        let verifying_key = VerifyingKey::<Sha256>::new(public_key);

        let message = self.canonical_message(transmission_id, timestamp, &request.body);
        Ok(verifying_key.verify(&message, &signature).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use rsa::pkcs1v15::SigningKey;
    use rsa::pkcs8::DecodePrivateKey;
    use rsa::signature::{SignatureEncoding, Signer};
    use rsa::RsaPrivateKey;

    const CERT_PEM: &str = include_str!("testdata/paypal_cert.pem");
    const PRIVATE_KEY_PEM: &str = include_str!("testdata/paypal_private.pem");

    const WEBHOOK_ID: &str = "WH-TEST-12345";
    const TRANSMISSION_ID: &str = "69cd13f0-d67a-11e5-baa3-778b53f4ae55";
    const TRANSMISSION_TIME: &str = "2024-01-15T16:45:30Z";
    const CERT_URL: &str = "https://api.paypal.com/v1/notifications/certs/CERT-360caa42";

    struct FixtureCertSource;

    #[async_trait]
    impl CertificateSource for FixtureCertSource {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, WebhookError> {
            Ok(CERT_PEM.as_bytes().to_vec())
        }
    }

    struct UnavailableCertSource;

    #[async_trait]
    impl CertificateSource for UnavailableCertSource {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, WebhookError> {
            Err(WebhookError::VerificationUnavailable(
                "cert endpoint timed out".to_string(),
            ))
        }
    }

    fn sign_canonical(webhook_id: &str, body: &[u8]) -> String {
        let key = RsaPrivateKey::from_pkcs8_pem(PRIVATE_KEY_PEM).unwrap();
        let signing_key = SigningKey::<Sha256>::new(key);

        let mut message = Vec::new();
        message.extend_from_slice(TRANSMISSION_ID.as_bytes());
        message.push(b'|');
        message.extend_from_slice(TRANSMISSION_TIME.as_bytes());
        message.push(b'|');
        message.extend_from_slice(webhook_id.as_bytes());
        message.push(b'|');
        message.extend_from_slice(body);

        BASE64.encode(signing_key.sign(&message).to_bytes())
    }

    fn signed_request(body: &[u8], signature: &str) -> RawWebhookRequest {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, signature.parse().unwrap());
        headers.insert(TRANSMISSION_ID_HEADER, TRANSMISSION_ID.parse().unwrap());
        headers.insert(TRANSMISSION_TIME_HEADER, TRANSMISSION_TIME.parse().unwrap());
        headers.insert(CERT_URL_HEADER, CERT_URL.parse().unwrap());
        headers.insert(AUTH_ALGO_HEADER, EXPECTED_AUTH_ALGO.parse().unwrap());
        RawWebhookRequest::new(headers, body.to_vec())
    }

    fn verifier() -> PaypalSignatureVerifier {
        PaypalSignatureVerifier::new(WEBHOOK_ID, Arc::new(FixtureCertSource))
    }

    #[tokio::test]
    async fn verify_valid_transmission() {
        let body = br#"{"id":"WH-EVT-1","event_type":"PAYMENT.SALE.COMPLETED"}"#;
        let signature = sign_canonical(WEBHOOK_ID, body);

        let result = verifier().verify_or_fail(&signed_request(body, &signature)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn verify_flipped_body_byte_fails() {
        let body = br#"{"id":"WH-EVT-1","event_type":"PAYMENT.SALE.COMPLETED"}"#.to_vec();
        let signature = sign_canonical(WEBHOOK_ID, &body);

        let mut tampered = body;
        tampered[12] ^= 0x01;

        let result = verifier()
            .verify_or_fail(&signed_request(&tampered, &signature))
            .await;

        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    #[tokio::test]
    async fn signature_over_other_webhook_id_fails() {
        // The webhook id is pinned from configuration; a signature computed
        // for a different registration must not validate
        let body = br#"{"id":"WH-EVT-1"}"#;
        let signature = sign_canonical("WH-OTHER-99999", body);

        let result = verifier().verify_or_fail(&signed_request(body, &signature)).await;

        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    #[tokio::test]
    async fn unexpected_auth_algo_fails() {
        let body = br#"{"id":"WH-EVT-1"}"#;
        let signature = sign_canonical(WEBHOOK_ID, body);
        let mut request = signed_request(body, &signature);
        request
            .headers
            .insert(AUTH_ALGO_HEADER, "SHA1withRSA".parse().unwrap());

        let result = verifier().verify_or_fail(&request).await;

        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    #[tokio::test]
    async fn missing_transmission_id_fails_with_missing_signature() {
        let body = br#"{"id":"WH-EVT-1"}"#;
        let signature = sign_canonical(WEBHOOK_ID, body);
        let mut request = signed_request(body, &signature);
        request.headers.remove(TRANSMISSION_ID_HEADER);

        let result = verifier().verify_or_fail(&request).await;

        assert!(matches!(
            result,
            Err(WebhookError::MissingSignature(TRANSMISSION_ID_HEADER))
        ));
    }

    #[tokio::test]
    async fn non_base64_signature_is_a_mismatch() {
        let body = br#"{"id":"WH-EVT-1"}"#;
        let result = verifier()
            .verify_or_fail(&signed_request(body, "%%%not-base64%%%"))
            .await;

        assert!(matches!(result, Err(WebhookError::BadSignature)));
    }

    #[tokio::test]
    async fn cert_fetch_failure_is_retryable() {
        let body = br#"{"id":"WH-EVT-1"}"#;
        let signature = sign_canonical(WEBHOOK_ID, body);
        let verifier = PaypalSignatureVerifier::new(WEBHOOK_ID, Arc::new(UnavailableCertSource));

        let result = verifier.verify_or_fail(&signed_request(body, &signature)).await;

        match result {
            Err(err @ WebhookError::VerificationUnavailable(_)) => assert!(err.is_retryable()),
            other => panic!("expected VerificationUnavailable, got {other:?}"),
        }
    }
}
