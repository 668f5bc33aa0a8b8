//! HTTP handlers for the webhook ingestion and store endpoints.
//!
//! These handlers connect Axum routes to the dispatcher pipeline. Webhook
//! endpoints take the raw body bytes: signature verification needs the
//! exact payload the provider signed, so nothing may deserialize it first.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::application::WebhookDispatcher;
use crate::domain::errors::WebhookError;
use crate::domain::payment::{PaymentProvider, RawWebhookRequest};
use crate::ports::Catalog;

use super::dto::{AckResponse, ErrorResponse, OrdersResponse, StoreItemsResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state, cloned per request.
#[derive(Clone)]
pub struct WebhookAppState {
    pub dispatcher: Arc<WebhookDispatcher>,
    pub catalog: Arc<dyn Catalog>,
}

impl std::fmt::Debug for WebhookAppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookAppState").finish_non_exhaustive()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Wrapper making pipeline errors respond with the right status code.
///
/// 4xx tells the provider the delivery is permanently bad; 5xx asks it
/// to redeliver.
pub struct ApiError(WebhookError);

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "webhook pipeline fault");
        } else {
            tracing::warn!(error = %self.0, "webhook rejected");
        }
        let body = ErrorResponse::new(self.0.to_string());
        (status, Json(body)).into_response()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handlers
// ════════════════════════════════════════════════════════════════════════════════

async fn dispatch_webhook(
    state: &WebhookAppState,
    provider: PaymentProvider,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let request = RawWebhookRequest::new(headers, body.to_vec());
    state.dispatcher.dispatch(provider, &request).await?;
    Ok((StatusCode::OK, Json(AckResponse::success())))
}

/// POST /webhook/apple - App Store server notifications
pub async fn handle_apple_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    dispatch_webhook(&state, PaymentProvider::Apple, headers, body).await
}

/// POST /webhook/google - Play real-time developer notifications
pub async fn handle_google_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    dispatch_webhook(&state, PaymentProvider::Google, headers, body).await
}

/// POST /webhook/paypal - PayPal webhook events
pub async fn handle_paypal_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    dispatch_webhook(&state, PaymentProvider::Paypal, headers, body).await
}

/// POST /webhook/coinbase - Coinbase Commerce events
pub async fn handle_coinbase_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    dispatch_webhook(&state, PaymentProvider::Coinbase, headers, body).await
}

/// POST /webhook/coinsub - CoinSub subscription events
pub async fn handle_coinsub_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    dispatch_webhook(&state, PaymentProvider::Coinsub, headers, body).await
}

/// POST /webhook/woocommerce - WooCommerce order and subscription events
pub async fn handle_woocommerce_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    dispatch_webhook(&state, PaymentProvider::Woocommerce, headers, body).await
}

// ════════════════════════════════════════════════════════════════════════════════
// Store Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// GET /store/items - List purchasable items, grouped by classification
pub async fn list_store_items(
    State(state): State<WebhookAppState>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.catalog.list_items().await?;
    Ok(Json(StoreItemsResponse::group(items)))
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// GET /store/orders?user_id= - List a user's orders
pub async fn list_store_orders(
    State(state): State<WebhookAppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = query.user_id.filter(|id| !id.is_empty()).ok_or_else(|| {
        WebhookError::Validation("user_id query parameter is required".to_string())
    })?;

    let orders = state.catalog.list_orders(&user_id).await?;
    Ok(Json(OrdersResponse { orders }))
}
