//! Canonical payment records handed to registered handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::item::ItemCategory;
use super::status::PurchaseStatus;

/// Record for a single (non-recurring) purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneTimePaymentData {
    pub user_id: String,
    pub item_category: ItemCategory,
    pub purchase_id: String,
    pub item_name: String,
    pub time_bought: DateTime<Utc>,
    pub status: PurchaseStatus,
    pub quantity: u32,

    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Record for a recurring subscription event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionPaymentData {
    pub user_id: String,
    pub item_category: ItemCategory,
    pub purchase_id: String,
    pub item_name: String,
    pub time_bought: DateTime<Utc>,
    pub status: PurchaseStatus,

    #[serde(default)]
    pub metadata: Map<String, Value>,
}
