//! Webhook pipeline error types.
//!
//! Defines every failure the ingestion pipeline can surface, with HTTP
//! status code mapping and retryability semantics. Providers redeliver
//! webhooks on 5xx responses, so the split between client and server
//! errors controls upstream retry behavior.

use axum::http::StatusCode;
use thiserror::Error;

use super::payment::ItemCategory;

/// Errors that occur while ingesting a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The provider's signature header is absent or unreadable.
    #[error("Missing signature header: {0}")]
    MissingSignature(&'static str),

    /// Cryptographic verification of the payload failed.
    #[error("Signature verification failed")]
    BadSignature,

    /// Verification could not be performed (certificate fetch failed or
    /// similar infrastructure fault). The provider should redeliver.
    #[error("Signature verification unavailable: {0}")]
    VerificationUnavailable(String),

    /// One or more required payload fields are absent. Collected in a
    /// single pass so the message names every missing field at once.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A present field failed coercion (for example a non-numeric amount).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The payload is not parseable as the provider's wire format.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No handler is registered for the item category the event resolved to.
    #[error("No handler registered for category: {0}")]
    NoHandlerRegistered(ItemCategory),

    /// A handler is already registered for this category.
    #[error("Handler already registered for category: {0}")]
    DuplicateHandler(ItemCategory),

    /// The event matched no configured route.
    #[error("Unroutable event: {0}")]
    UnroutableEvent(String),

    /// A collaborator call (catalog, relay sink, handler) failed.
    #[error("Collaborator fault: {0}")]
    CollaboratorFault(String),
}

impl WebhookError {
    /// Returns true if the provider should retry delivering this webhook.
    ///
    /// Only infrastructure faults are retryable; verification and payload
    /// errors will fail identically on redelivery.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::VerificationUnavailable(_) | WebhookError::CollaboratorFault(_)
        )
    }

    /// Maps the error to the HTTP status code returned to the provider.
    ///
    /// 4xx stops provider redelivery, 5xx triggers it.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature(_)
            | WebhookError::BadSignature
            | WebhookError::MissingFields(_)
            | WebhookError::Validation(_)
            | WebhookError::Parse(_)
            | WebhookError::NoHandlerRegistered(_)
            | WebhookError::UnroutableEvent(_) => StatusCode::BAD_REQUEST,

            // Assembly-time misuse surfacing at request time is a server bug
            WebhookError::DuplicateHandler(_) => StatusCode::INTERNAL_SERVER_ERROR,

            WebhookError::VerificationUnavailable(_) | WebhookError::CollaboratorFault(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
