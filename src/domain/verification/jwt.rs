//! JWT webhook verification with algorithm pinning (Apple, Google).
//!
//! App-store style providers deliver a JWT in a signature header. Each
//! provider's verifier pins exactly one algorithm: a token claiming `none`
//! or any other algorithm is rejected before signature checking, even if
//! its signature would validate under the claimed algorithm. The public
//! key is loaded once from PEM at construction.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;

use super::SignatureVerifier;
use crate::domain::errors::WebhookError;
use crate::domain::payment::RawWebhookRequest;

/// Extracts the expected audience claim from the raw payload, when the
/// provider pins `aud` to an identifier carried in the body.
pub type AudienceExtractor = fn(&Value) -> Option<String>;

/// The algorithms this pipeline accepts for JWT-signed webhooks.
///
/// A closed two-value set on purpose: anything else (including `none`)
/// is a verification failure, not a configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtAlgorithm {
    /// ECDSA P-256 with SHA-256 (Apple).
    Es256,
    /// RSA PKCS#1 v1.5 with SHA-256 (Google).
    Rs256,
}

impl JwtAlgorithm {
    fn as_jsonwebtoken(self) -> Algorithm {
        match self {
            JwtAlgorithm::Es256 => Algorithm::ES256,
            JwtAlgorithm::Rs256 => Algorithm::RS256,
        }
    }

    fn decoding_key(self, public_key_pem: &[u8]) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
        match self {
            JwtAlgorithm::Es256 => DecodingKey::from_ec_pem(public_key_pem),
            JwtAlgorithm::Rs256 => DecodingKey::from_rsa_pem(public_key_pem),
        }
    }
}

/// JWT verifier pinned to a single algorithm and public key.
pub struct JwtVerifier {
    header: &'static str,
    algorithm: JwtAlgorithm,
    decoding_key: DecodingKey,
    audience_extractor: Option<AudienceExtractor>,
}

impl JwtVerifier {
    /// Creates a verifier for `header`, accepting only `algorithm` signed
    /// by the key in `public_key_pem`.
    ///
    /// # Errors
    ///
    /// Fails if the PEM does not contain a key usable with `algorithm`;
    /// callers surface this as a configuration error at assembly time.
    pub fn new(
        header: &'static str,
        algorithm: JwtAlgorithm,
        public_key_pem: &[u8],
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            header,
            algorithm,
            decoding_key: algorithm.decoding_key(public_key_pem)?,
            audience_extractor: None,
        })
    }

    /// Additionally pins the token's `aud` claim to an identifier extracted
    /// from the payload (typically the transaction id).
    pub fn with_audience_pin(mut self, extractor: AudienceExtractor) -> Self {
        self.audience_extractor = Some(extractor);
        self
    }

    fn build_validation(&self, payload: &[u8]) -> Validation {
        let mut validation = Validation::new(self.algorithm.as_jsonwebtoken());
        // Webhook JWTs are authenticity proofs, not sessions: no exp claim
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        if let Some(extractor) = self.audience_extractor {
            if let Some(audience) = serde_json::from_slice::<Value>(payload)
                .ok()
                .as_ref()
                .and_then(extractor)
            {
                validation.validate_aud = true;
                validation.set_audience(&[audience]);
            }
        }

        validation
    }
}

#[async_trait]
impl SignatureVerifier for JwtVerifier {
    fn signature_header(&self) -> &'static str {
        self.header
    }

    async fn verify(
        &self,
        request: &RawWebhookRequest,
        signature: &str,
    ) -> Result<bool, WebhookError> {
        let token = signature.trim();

        // Malformed tokens (including alg "none", which jsonwebtoken will
        // not represent) are mismatches, not infrastructure faults
        let token_header = match decode_header(token) {
            Ok(header) => header,
            Err(_) => return Ok(false),
        };

        // Reject before signature checking when the token claims any other
        // algorithm; the allow-list has exactly one entry
        if token_header.alg != self.algorithm.as_jsonwebtoken() {
            return Ok(false);
        }

        let validation = self.build_validation(&request.body);
        Ok(decode::<Value>(token, &self.decoding_key, &validation).is_ok())
    }
}
