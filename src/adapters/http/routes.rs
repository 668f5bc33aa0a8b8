//! Axum router configuration for the webhook and store endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{
    handle_apple_webhook, handle_coinbase_webhook, handle_coinsub_webhook, handle_google_webhook,
    handle_paypal_webhook, handle_woocommerce_webhook, list_store_items, list_store_orders,
    WebhookAppState,
};

/// Create the webhook ingestion router.
///
/// One endpoint per provider; no authentication beyond the provider's
/// own signature, which the pipeline verifies before anything else.
///
/// # Routes
/// - `POST /apple` - App Store server notifications
/// - `POST /google` - Play real-time developer notifications
/// - `POST /paypal` - PayPal webhook events
/// - `POST /coinbase` - Coinbase Commerce events
/// - `POST /coinsub` - CoinSub subscription events
/// - `POST /woocommerce` - WooCommerce order and subscription events
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new()
        .route("/apple", post(handle_apple_webhook))
        .route("/google", post(handle_google_webhook))
        .route("/paypal", post(handle_paypal_webhook))
        .route("/coinbase", post(handle_coinbase_webhook))
        .route("/coinsub", post(handle_coinsub_webhook))
        .route("/woocommerce", post(handle_woocommerce_webhook))
}

/// Create the store read router.
///
/// # Routes
/// - `GET /items` - purchasable items grouped by classification
/// - `GET /orders?user_id=` - a user's order history
pub fn store_routes() -> Router<WebhookAppState> {
    Router::new()
        .route("/items", get(list_store_items))
        .route("/orders", get(list_store_orders))
}

/// Create the complete service router, suitable for serving directly.
pub fn webhook_router() -> Router<WebhookAppState> {
    Router::new()
        .nest("/webhook", webhook_routes())
        .nest("/store", store_routes())
        .layer(TraceLayer::new_for_http())
}
