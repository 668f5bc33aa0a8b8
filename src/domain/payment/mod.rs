//! Canonical payment model shared across the pipeline.
//!
//! Providers speak divergent wire formats; everything past the parser
//! speaks these types.

mod event;
mod item;
mod provider;
mod records;
mod status;

pub use event::{ProviderEventData, RawWebhookRequest};
pub use item::{AvailableItem, ItemCategory, ItemType, PurchaseDetail};
pub use provider::PaymentProvider;
pub use records::{OneTimePaymentData, SubscriptionPaymentData};
pub use status::PurchaseStatus;
