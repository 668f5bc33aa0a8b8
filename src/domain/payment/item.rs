//! Item classification types shared between the catalog and the pipeline.

use serde::{Deserialize, Serialize};

use super::status::PurchaseStatus;

/// Classification of a purchasable item resolved through the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Single purchase with a quantity.
    OneTimePayment,

    /// Recurring subscription.
    Subscription,

    /// Item name not known to the catalog.
    Unknown,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::OneTimePayment => "one_time_payment",
            ItemType::Subscription => "subscription",
            ItemType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handler registry key carried on every canonical payment record.
///
/// Categories are application-defined strings; providers emit the
/// `ONE_TIME` and `SUBSCRIPTION` defaults unless configured otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCategory(String);

impl ItemCategory {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Default category for one-time purchases.
    pub fn one_time() -> Self {
        Self("ONE_TIME".to_string())
    }

    /// Default category for subscriptions.
    pub fn subscription() -> Self {
        Self("SUBSCRIPTION".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A purchasable item as listed by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableItem {
    /// Item name as resolved during classification.
    pub name: String,

    /// One-time or subscription.
    pub item_type: ItemType,

    /// Handler registry key for this item.
    pub category: ItemCategory,

    /// Price in major currency units.
    pub price: f64,

    /// ISO 4217 currency code.
    pub currency: String,
}

/// An order row as reported by the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDetail {
    pub order_id: String,
    pub user_id: String,
    pub item_name: String,
    pub item_category: ItemCategory,

    /// Present for one-time purchases only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    /// RFC 3339 purchase timestamp.
    pub time_bought: String,

    pub status: PurchaseStatus,

    /// Provider that produced the originating event.
    pub provider: String,
}
