//! Configuration-driven construction of the webhook pipeline.
//!
//! Assembly is the only place that knows which concrete verifier, parser,
//! and enrichment client belong to each provider. Everything fallible
//! (key parsing, incomplete sections) fails here, at startup, so request
//! handling never discovers a misconfigured provider.

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::catalog::{CatalogClientConfig, HttpCatalog};
use crate::adapters::certificates::HttpCertificateSource;
use crate::adapters::forwarder::{RestForwarder, WebSocketForwarder};
use crate::adapters::http::WebhookAppState;
use crate::adapters::provider_api::{
    AppleReceiptClient, CoinbaseCommerceClient, GooglePlayClient, PaypalClient, WooCommerceClient,
};
use crate::application::{ProviderStrategy, WebhookDispatcher};
use crate::config::{AppConfig, ForwarderMode, ValidationError};
use crate::domain::payment::PaymentProvider;
use crate::domain::providers::{
    AppleParser, CoinbaseParser, CoinsubParser, GoogleParser, PaypalParser, WooCommerceParser,
};
use crate::domain::verification::{HmacVerifier, JwtAlgorithm, JwtVerifier};
use crate::domain::verification::PaypalSignatureVerifier;
use crate::ports::{Catalog, Forwarder};

/// Apple and Google both deliver their JWT in this header.
const JWT_SIGNATURE_HEADER: &str = "Signature";

const COINBASE_SIGNATURE_HEADER: &str = "X-CC-Webhook-Signature";
const COINSUB_SIGNATURE_HEADER: &str = "Coinsub-Signature";
const WOOCOMMERCE_SIGNATURE_HEADER: &str = "X-WC-Webhook-Signature";

/// Builds the complete application state from validated configuration.
///
/// Only providers with a configuration section are registered; webhooks
/// for anything else are rejected as unroutable.
pub fn build_state(config: &AppConfig) -> Result<WebhookAppState, ValidationError> {
    let catalog: Arc<dyn Catalog> = Arc::new(HttpCatalog::new(
        CatalogClientConfig::new(&config.catalog.base_url)
            .with_timeout(Duration::from_secs(config.catalog.timeout_secs)),
    ));

    let mut dispatcher = WebhookDispatcher::new(catalog.clone());

    if let Some(apple) = &config.providers.apple {
        let verifier = JwtVerifier::new(
            JWT_SIGNATURE_HEADER,
            JwtAlgorithm::Es256,
            apple.public_key_pem.as_bytes(),
        )
        .map_err(|e| ValidationError::InvalidVerificationKey("apple", e.to_string()))?;

        let mut parser = AppleParser::new();
        if apple.receipt_shared_secret.is_some() {
            parser = parser.with_api(Arc::new(AppleReceiptClient::new(
                apple.receipt_shared_secret.clone(),
            )));
        }

        dispatcher.register_provider(
            PaymentProvider::Apple,
            ProviderStrategy {
                verifier: Arc::new(verifier),
                parser: Arc::new(parser),
            },
        );
    }

    if let Some(google) = &config.providers.google {
        let verifier = JwtVerifier::new(
            JWT_SIGNATURE_HEADER,
            JwtAlgorithm::Rs256,
            google.public_key_pem.as_bytes(),
        )
        .map_err(|e| ValidationError::InvalidVerificationKey("google", e.to_string()))?;

        let mut parser = GoogleParser::new();
        if let (Some(package_name), Some(api_token)) = (&google.package_name, &google.api_token) {
            parser = parser.with_api(Arc::new(GooglePlayClient::new(
                package_name.clone(),
                api_token.clone(),
            )));
        }

        dispatcher.register_provider(
            PaymentProvider::Google,
            ProviderStrategy {
                verifier: Arc::new(verifier),
                parser: Arc::new(parser),
            },
        );
    }

    if let Some(paypal) = &config.providers.paypal {
        let verifier = PaypalSignatureVerifier::new(
            paypal.webhook_id.clone(),
            Arc::new(HttpCertificateSource::new()),
        );

        let mut parser = PaypalParser::new();
        if let (Some(client_id), Some(client_secret)) = (&paypal.client_id, &paypal.client_secret)
        {
            parser = parser.with_api(Arc::new(PaypalClient::new(
                client_id.clone(),
                client_secret.clone(),
                paypal.sandbox,
            )));
        }

        dispatcher.register_provider(
            PaymentProvider::Paypal,
            ProviderStrategy {
                verifier: Arc::new(verifier),
                parser: Arc::new(parser),
            },
        );
    }

    if let Some(coinbase) = &config.providers.coinbase {
        let verifier =
            HmacVerifier::new(COINBASE_SIGNATURE_HEADER, coinbase.shared_secret.clone());

        let mut parser = CoinbaseParser::new();
        if let Some(api_key) = &coinbase.api_key {
            parser = parser.with_api(Arc::new(CoinbaseCommerceClient::new(api_key.clone())));
        }

        dispatcher.register_provider(
            PaymentProvider::Coinbase,
            ProviderStrategy {
                verifier: Arc::new(verifier),
                parser: Arc::new(parser),
            },
        );
    }

    if let Some(coinsub) = &config.providers.coinsub {
        let verifier = HmacVerifier::new(COINSUB_SIGNATURE_HEADER, coinsub.shared_secret.clone());

        dispatcher.register_provider(
            PaymentProvider::Coinsub,
            ProviderStrategy {
                verifier: Arc::new(verifier),
                parser: Arc::new(CoinsubParser::new()),
            },
        );
    }

    if let Some(woocommerce) = &config.providers.woocommerce {
        let verifier = HmacVerifier::new(
            WOOCOMMERCE_SIGNATURE_HEADER,
            woocommerce.webhook_secret.clone(),
        );

        let mut parser = WooCommerceParser::new();
        if let (Some(api_url), Some(consumer_key), Some(consumer_secret)) = (
            &woocommerce.api_url,
            &woocommerce.consumer_key,
            &woocommerce.consumer_secret,
        ) {
            parser = parser.with_api(Arc::new(WooCommerceClient::new(
                api_url.clone(),
                consumer_key.clone(),
                consumer_secret.clone(),
            )));
        }

        dispatcher.register_provider(
            PaymentProvider::Woocommerce,
            ProviderStrategy {
                verifier: Arc::new(verifier),
                parser: Arc::new(parser),
            },
        );
    }

    if let Some(forwarder) = build_forwarder(config, catalog.clone())? {
        dispatcher = dispatcher.with_forwarder(forwarder);
    }

    Ok(WebhookAppState {
        dispatcher: Arc::new(dispatcher),
        catalog,
    })
}

fn build_forwarder(
    config: &AppConfig,
    catalog: Arc<dyn Catalog>,
) -> Result<Option<Arc<dyn Forwarder>>, ValidationError> {
    match config.forwarder.mode {
        ForwarderMode::None => Ok(None),
        ForwarderMode::Rest => {
            let base_url = config
                .forwarder
                .rest_base_url
                .as_deref()
                .ok_or(ValidationError::MissingForwarderUrl("rest"))?;
            let forwarder = RestForwarder::new(catalog, base_url)
                .with_route(config.forwarder.rest_route.clone());
            Ok(Some(Arc::new(forwarder)))
        }
        ForwarderMode::Websocket => {
            let forwarder =
                WebSocketForwarder::new(catalog, config.forwarder.websocket_url.clone());
            Ok(Some(Arc::new(forwarder)))
        }
    }
}
