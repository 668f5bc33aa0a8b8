//! Amount normalization.
//!
//! Providers disagree on amount encoding: some send decimal strings
//! (`"9.99"`), some integer micros (`"9990000"`). Both normalize to major
//! currency units as `f64`. A non-numeric amount is a `Validation` failure,
//! never a silent NaN.

use serde_json::Value;

use crate::domain::errors::WebhookError;

const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Parses an amount expressed as a decimal string or JSON number.
pub fn decimal_amount(value: Option<&Value>, field: &'static str) -> Result<f64, WebhookError> {
    let value = match value {
        None | Some(Value::Null) => return Err(WebhookError::MissingFields(vec![field])),
        Some(value) => value,
    };

    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match amount {
        Some(a) if a.is_finite() => Ok(a),
        _ => Err(WebhookError::Validation(format!(
            "{field} is not a numeric amount: {value}"
        ))),
    }
}

/// Parses an amount expressed as integer micros (1/1,000,000 units).
pub fn micros_amount(value: Option<&Value>, field: &'static str) -> Result<f64, WebhookError> {
    Ok(decimal_amount(value, field)? / MICROS_PER_UNIT)
}
