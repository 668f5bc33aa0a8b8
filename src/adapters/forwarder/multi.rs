//! Routing forwarder: picks a downstream sink per event.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::WebhookError;
use crate::domain::payment::ProviderEventData;
use crate::ports::Forwarder;

type Discriminator = Box<dyn Fn(&ProviderEventData) -> String + Send + Sync>;

/// Delegates each event to the named forwarder the discriminator selects.
///
/// An event whose discriminator names no registered forwarder is
/// unroutable; the status write is the responsibility of whichever
/// delegate would have handled it, so nothing is persisted for
/// unmatched events.
pub struct MultiForwarder {
    discriminator: Discriminator,
    forwarders: HashMap<String, Arc<dyn Forwarder>>,
}

impl MultiForwarder {
    pub fn new<D>(discriminator: D) -> Self
    where
        D: Fn(&ProviderEventData) -> String + Send + Sync + 'static,
    {
        Self {
            discriminator: Box::new(discriminator),
            forwarders: HashMap::new(),
        }
    }

    pub fn with_forwarder(mut self, name: impl Into<String>, forwarder: Arc<dyn Forwarder>) -> Self {
        self.forwarders.insert(name.into(), forwarder);
        self
    }
}

#[async_trait]
impl Forwarder for MultiForwarder {
    async fn forward_event(&self, event: &ProviderEventData) -> Result<(), WebhookError> {
        let name = (self.discriminator)(event);
        match self.forwarders.get(&name) {
            Some(forwarder) => forwarder.forward_event(event).await,
            None => Err(WebhookError::UnroutableEvent(format!(
                "no forwarder named {name:?} for {} event {}",
                event.provider, event.transaction_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::domain::payment::{PaymentProvider, PurchaseStatus};

    struct CountingForwarder {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl Forwarder for CountingForwarder {
        async fn forward_event(&self, _event: &ProviderEventData) -> Result<(), WebhookError> {
            *self.calls.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn event(provider: PaymentProvider) -> ProviderEventData {
        ProviderEventData {
            provider,
            transaction_id: "t-1".to_string(),
            amount: 1.0,
            currency: "USD".to_string(),
            status: PurchaseStatus::Paid,
            user_id: None,
            subscription_id: None,
            order_id: None,
            metadata: serde_json::Map::new(),
        }
    }

    fn by_settlement_rail(event: &ProviderEventData) -> String {
        match event.provider {
            PaymentProvider::Coinbase | PaymentProvider::Coinsub => "crypto".to_string(),
            _ => "stores".to_string(),
        }
    }

    #[tokio::test]
    async fn discriminator_selects_named_forwarder() {
        let crypto = Arc::new(CountingForwarder {
            calls: Mutex::new(0),
        });
        let stores = Arc::new(CountingForwarder {
            calls: Mutex::new(0),
        });

        let multi = MultiForwarder::new(by_settlement_rail)
            .with_forwarder("crypto", crypto.clone())
            .with_forwarder("stores", stores.clone());

        multi.forward_event(&event(PaymentProvider::Coinbase)).await.unwrap();
        multi.forward_event(&event(PaymentProvider::Apple)).await.unwrap();

        assert_eq!(*crypto.calls.lock().unwrap(), 1);
        assert_eq!(*stores.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn unregistered_name_is_unroutable() {
        let multi = MultiForwarder::new(by_settlement_rail);
        let err = multi
            .forward_event(&event(PaymentProvider::Paypal))
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::UnroutableEvent(_)));
    }
}
