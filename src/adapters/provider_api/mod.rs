//! HTTP clients for the provider enrichment APIs.

pub mod apple;
pub mod coinbase;
pub mod google;
pub mod paypal;
pub mod woocommerce;

pub use apple::AppleReceiptClient;
pub use coinbase::CoinbaseCommerceClient;
pub use google::GooglePlayClient;
pub use paypal::PaypalClient;
pub use woocommerce::WooCommerceClient;

use crate::domain::errors::WebhookError;

pub(crate) fn api_fault(context: &str, error: impl std::fmt::Display) -> WebhookError {
    WebhookError::CollaboratorFault(format!("{context}: {error}"))
}
