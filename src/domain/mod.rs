//! Domain layer containing the canonical payment model and pipeline logic.
//!
//! # Module Organization
//!
//! - `payment` - Canonical event/status/record types shared across the pipeline
//! - `verification` - Per-provider signature verification strategies
//! - `providers` - Per-provider event parsing and status mapping
//! - `errors` - The webhook error taxonomy with HTTP and retry semantics

pub mod errors;
pub mod payment;
pub mod providers;
pub mod verification;
