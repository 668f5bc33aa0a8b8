//! Paygate - Payment Webhook Ingestion Pipeline
//!
//! Receives webhooks from payment providers (Apple, Google, PayPal,
//! Coinbase, CoinSub), verifies their signatures, normalizes them into a
//! canonical event, classifies the purchased item against a catalog
//! service, and routes the result to a downstream forwarder or registered
//! payment handlers.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
