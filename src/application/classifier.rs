//! Item classification against the catalog collaborator.

use std::sync::Arc;

use crate::domain::errors::WebhookError;
use crate::domain::payment::ItemType;
use crate::ports::Catalog;

/// Resolves derived item names to their catalog classification.
///
/// `Unknown` is a normal answer here, never an error; deciding that an
/// unknown item is unroutable is the dispatcher's job. Catalog transport
/// faults pass through as retryable `CollaboratorFault`s.
pub struct ItemClassifier {
    catalog: Arc<dyn Catalog>,
}

impl ItemClassifier {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Classifies an item name through the catalog.
    pub async fn classify(&self, item_name: &str) -> Result<ItemType, WebhookError> {
        let item_type = self.catalog.resolve_item_type(item_name).await?;
        tracing::debug!(item_name, item_type = %item_type, "item classified");
        Ok(item_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::domain::payment::{AvailableItem, PurchaseDetail, PurchaseStatus};

    struct StaticCatalog {
        answer: ItemType,
    }

    #[async_trait]
    impl Catalog for StaticCatalog {
        async fn resolve_item_type(&self, _name: &str) -> Result<ItemType, WebhookError> {
            Ok(self.answer)
        }

        async fn update_order_status(
            &self,
            _order_id: &str,
            _status: PurchaseStatus,
        ) -> Result<(), WebhookError> {
            Ok(())
        }

        async fn list_orders(&self, _user_id: &str) -> Result<Vec<PurchaseDetail>, WebhookError> {
            Ok(vec![])
        }

        async fn list_items(&self) -> Result<Vec<AvailableItem>, WebhookError> {
            Ok(vec![])
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl Catalog for BrokenCatalog {
        async fn resolve_item_type(&self, _name: &str) -> Result<ItemType, WebhookError> {
            Err(WebhookError::CollaboratorFault("catalog unreachable".to_string()))
        }

        async fn update_order_status(
            &self,
            _order_id: &str,
            _status: PurchaseStatus,
        ) -> Result<(), WebhookError> {
            Ok(())
        }

        async fn list_orders(&self, _user_id: &str) -> Result<Vec<PurchaseDetail>, WebhookError> {
            Ok(vec![])
        }

        async fn list_items(&self) -> Result<Vec<AvailableItem>, WebhookError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn unknown_is_an_answer_not_an_error() {
        let classifier = ItemClassifier::new(Arc::new(StaticCatalog {
            answer: ItemType::Unknown,
        }));

        let result = classifier.classify("Mystery Item").await.unwrap();
        assert_eq!(result, ItemType::Unknown);
    }

    #[tokio::test]
    async fn catalog_fault_surfaces_as_retryable() {
        let classifier = ItemClassifier::new(Arc::new(BrokenCatalog));

        let err = classifier.classify("Premium").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
