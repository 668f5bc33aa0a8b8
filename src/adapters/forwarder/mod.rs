//! Downstream relay implementations.
//!
//! Every forwarder obeys the same contract: advance the order's status in
//! the catalog first, relay the canonical event second. Provider retries
//! re-run both steps, so a relay failure after a successful status write
//! heals on redelivery.

pub mod multi;
pub mod rest;
pub mod websocket;

pub use multi::MultiForwarder;
pub use rest::RestForwarder;
pub use websocket::WebSocketForwarder;
