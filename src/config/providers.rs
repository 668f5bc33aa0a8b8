//! Per-provider webhook configuration
//!
//! Each provider section is optional; only configured providers are wired
//! into the dispatcher at assembly. A section that is present must carry
//! its verification material, since a provider without working signature
//! verification must not accept webhooks at all.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Provider configuration root
#[derive(Debug, Default, Deserialize)]
pub struct ProvidersConfig {
    pub apple: Option<AppleConfig>,
    pub google: Option<GoogleConfig>,
    pub paypal: Option<PaypalConfig>,
    pub coinbase: Option<CoinbaseConfig>,
    pub coinsub: Option<CoinsubConfig>,
    pub woocommerce: Option<WoocommerceConfig>,
}

/// Apple App Store notifications (JWT, ES256)
#[derive(Debug, Deserialize)]
pub struct AppleConfig {
    /// PEM-encoded ES256 public key used to verify the `Signature` JWT
    pub public_key_pem: String,

    /// Shared secret for `verifyReceipt` enrichment, if enabled
    pub receipt_shared_secret: Option<SecretString>,
}

/// Google Play real-time developer notifications (JWT, RS256)
#[derive(Debug, Deserialize)]
pub struct GoogleConfig {
    /// PEM-encoded RS256 public key used to verify the `Signature` JWT
    pub public_key_pem: String,

    /// Play package name, required for Play Developer API enrichment
    pub package_name: Option<String>,

    /// Pre-issued OAuth bearer token for the Play Developer API
    pub api_token: Option<SecretString>,
}

/// PayPal webhooks (RSA signature over a canonical message)
#[derive(Debug, Deserialize)]
pub struct PaypalConfig {
    /// Webhook id assigned by PayPal, part of the signed message
    pub webhook_id: String,

    /// REST API credentials, required for order/subscription enrichment
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,

    /// Use the sandbox REST endpoints
    #[serde(default)]
    pub sandbox: bool,
}

/// Coinbase Commerce webhooks (HMAC-SHA256)
#[derive(Debug, Deserialize)]
pub struct CoinbaseConfig {
    /// Webhook shared secret from the Commerce dashboard
    pub shared_secret: SecretString,

    /// Commerce API key, required for charge enrichment
    pub api_key: Option<SecretString>,
}

/// CoinSub webhooks (HMAC-SHA256)
#[derive(Debug, Deserialize)]
pub struct CoinsubConfig {
    /// Webhook shared secret
    pub shared_secret: SecretString,
}

/// WooCommerce webhooks (HMAC-SHA256)
#[derive(Debug, Deserialize)]
pub struct WoocommerceConfig {
    /// Webhook shared secret from the store's webhook settings
    pub webhook_secret: SecretString,

    /// Store base URL, required for order/subscription enrichment
    pub api_url: Option<String>,

    /// REST API consumer credentials, required for enrichment
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<SecretString>,
}

impl ProvidersConfig {
    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(apple) = &self.apple {
            if apple.public_key_pem.trim().is_empty() {
                return Err(ValidationError::MissingRequired(
                    "PROVIDERS__APPLE__PUBLIC_KEY_PEM",
                ));
            }
        }
        if let Some(google) = &self.google {
            if google.public_key_pem.trim().is_empty() {
                return Err(ValidationError::MissingRequired(
                    "PROVIDERS__GOOGLE__PUBLIC_KEY_PEM",
                ));
            }
        }
        if let Some(paypal) = &self.paypal {
            if paypal.webhook_id.trim().is_empty() {
                return Err(ValidationError::MissingRequired(
                    "PROVIDERS__PAYPAL__WEBHOOK_ID",
                ));
            }
        }
        if let Some(coinbase) = &self.coinbase {
            if coinbase.shared_secret.expose_secret().is_empty() {
                return Err(ValidationError::MissingRequired(
                    "PROVIDERS__COINBASE__SHARED_SECRET",
                ));
            }
        }
        if let Some(coinsub) = &self.coinsub {
            if coinsub.shared_secret.expose_secret().is_empty() {
                return Err(ValidationError::MissingRequired(
                    "PROVIDERS__COINSUB__SHARED_SECRET",
                ));
            }
        }
        if let Some(woocommerce) = &self.woocommerce {
            if woocommerce.webhook_secret.expose_secret().is_empty() {
                return Err(ValidationError::MissingRequired(
                    "PROVIDERS__WOOCOMMERCE__WEBHOOK_SECRET",
                ));
            }
        }
        Ok(())
    }

    /// True if at least one provider section is present
    pub fn any_configured(&self) -> bool {
        self.apple.is_some()
            || self.google.is_some()
            || self.paypal.is_some()
            || self.coinbase.is_some()
            || self.coinsub.is_some()
            || self.woocommerce.is_some()
    }
}
