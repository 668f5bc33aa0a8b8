//! HTTP DTOs for the webhook and store endpoints.
//!
//! These types define the JSON envelope the service speaks to providers
//! and store clients. They are the boundary between HTTP and the pipeline.

use serde::Serialize;

use crate::domain::payment::{AvailableItem, ItemType, PurchaseDetail};

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Acknowledgement returned for every accepted webhook.
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

impl AckResponse {
    pub fn success() -> Self {
        Self { status: "success" }
    }
}

/// Error envelope returned for every rejected request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

/// Store catalog listing, grouped by classification.
#[derive(Debug, Clone, Serialize)]
pub struct StoreItemsResponse {
    pub one_time_payment: Vec<AvailableItem>,
    pub subscription: Vec<AvailableItem>,
}

impl StoreItemsResponse {
    pub fn group(items: Vec<AvailableItem>) -> Self {
        let mut grouped = Self {
            one_time_payment: Vec::new(),
            subscription: Vec::new(),
        };
        for item in items {
            match item.item_type {
                ItemType::OneTimePayment => grouped.one_time_payment.push(item),
                ItemType::Subscription => grouped.subscription.push(item),
                // Items the catalog itself cannot classify are not sellable
                ItemType::Unknown => {}
            }
        }
        grouped
    }
}

/// A user's order history.
#[derive(Debug, Clone, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<PurchaseDetail>,
}
