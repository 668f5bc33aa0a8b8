//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the pipeline to external systems:
//! - `catalog` - HTTP client for the catalog/store collaborator
//! - `certificates` - Remote certificate fetch with an in-memory cache
//! - `forwarder` - REST, WebSocket, and routing forwarders
//! - `provider_api` - Narrow clients for each provider's verification API
//! - `http` - Axum routes and handlers for the inbound webhook surface
//! - `assembly` - Configuration-driven construction of the dispatcher

pub mod assembly;
pub mod catalog;
pub mod certificates;
pub mod forwarder;
pub mod http;
pub mod provider_api;

pub use catalog::HttpCatalog;
pub use certificates::HttpCertificateSource;
