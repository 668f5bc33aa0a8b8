//! The closed set of supported payment providers.

use serde::{Deserialize, Serialize};

/// Payment providers this pipeline accepts webhooks from.
///
/// The set is closed on purpose: routing and strategy assembly match
/// exhaustively over it, so adding a provider is a compile-visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Apple,
    Google,
    Paypal,
    Coinbase,
    Coinsub,
    Woocommerce,
}

impl PaymentProvider {
    /// All providers, in route-registration order.
    pub const ALL: [PaymentProvider; 6] = [
        PaymentProvider::Apple,
        PaymentProvider::Google,
        PaymentProvider::Paypal,
        PaymentProvider::Coinbase,
        PaymentProvider::Coinsub,
        PaymentProvider::Woocommerce,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Apple => "apple",
            PaymentProvider::Google => "google",
            PaymentProvider::Paypal => "paypal",
            PaymentProvider::Coinbase => "coinbase",
            PaymentProvider::Coinsub => "coinsub",
            PaymentProvider::Woocommerce => "woocommerce",
        }
    }
}

impl std::fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&PaymentProvider::Apple).unwrap(),
            "\"apple\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentProvider::Coinsub).unwrap(),
            "\"coinsub\""
        );
    }

    #[test]
    fn all_lists_every_provider_once() {
        let mut names: Vec<&str> = PaymentProvider::ALL.iter().map(|p| p.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 6);
    }
}
