//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the pipeline and the outside world. Adapters implement these ports.
//!
//! ## Collaborator Ports
//!
//! - `Catalog` - Item classification and order persistence (external store service)
//! - `Forwarder` - Downstream relay of canonical events
//! - `OneTimePaymentHandler` / `SubscriptionPaymentHandler` - Locally registered
//!   payment handlers, keyed by item category
//!
//! ## Provider Verification Ports
//!
//! - `AppleReceiptApi`, `GooglePlayApi`, `PaypalApi`, `CoinbaseCommerceApi`,
//!   `WooCommerceApi` - Narrow read/ack surfaces of each provider's own API,
//!   used for enrichment
//! - `CertificateSource` - Remote certificate fetch for RSA webhook verification

mod catalog;
mod certificate_source;
mod forwarder;
mod payment_handlers;
mod provider_api;

pub use catalog::Catalog;
pub use certificate_source::CertificateSource;
pub use forwarder::Forwarder;
pub use payment_handlers::{OneTimePaymentHandler, SubscriptionPaymentHandler};
pub use provider_api::{
    AppleReceiptApi, CoinbaseCommerceApi, GooglePlayApi, PaypalApi, WooCommerceApi,
};
