//! Catalog/store collaborator port.

use async_trait::async_trait;

use crate::domain::errors::WebhookError;
use crate::domain::payment::{AvailableItem, ItemType, PurchaseDetail, PurchaseStatus};

/// Port for the external catalog/store service.
///
/// The catalog owns the product list and order persistence; this crate only
/// reads item classifications and advances order status. Transport faults
/// surface as `WebhookError::CollaboratorFault` (retryable).
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolves an item name to its classification.
    ///
    /// Names the catalog does not know resolve to `ItemType::Unknown`;
    /// that is a normal answer, not an error.
    async fn resolve_item_type(&self, name: &str) -> Result<ItemType, WebhookError>;

    /// Advances the persisted status of an order.
    async fn update_order_status(
        &self,
        order_id: &str,
        status: PurchaseStatus,
    ) -> Result<(), WebhookError>;

    /// Lists the orders belonging to a user.
    async fn list_orders(&self, user_id: &str) -> Result<Vec<PurchaseDetail>, WebhookError>;

    /// Lists every purchasable item the catalog offers.
    async fn list_items(&self) -> Result<Vec<AvailableItem>, WebhookError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_object_safe() {
        fn assert_object_safe(_: &dyn Catalog) {}
        let _ = assert_object_safe;
    }
}
