//! Inbound HTTP surface: webhook endpoints and store reads.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, WebhookAppState};
pub use routes::{store_routes, webhook_router, webhook_routes};
