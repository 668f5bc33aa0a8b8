//! Application layer - the pipeline orchestration.
//!
//! Composes domain verification/parsing strategies with the ports into the
//! per-request dispatcher. All side effects flow through here.

pub mod classifier;
pub mod dispatcher;

pub use classifier::ItemClassifier;
pub use dispatcher::{ProviderStrategy, WebhookDispatcher};
