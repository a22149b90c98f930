//! Validation utilities for stock workflow input
//!
//! Form values arrive from the browser UI as loosely typed JSON. These helpers
//! normalize them before they reach the database.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum stored length of free-text request fields
pub const MAX_FIELD_LENGTH: usize = 50;

/// Largest quantity accepted for a single entry, request or dispatch
pub const MAX_QUANTITY: i64 = 1_000_000_000;

// ============================================================================
// Text fields
// ============================================================================

/// Trim surrounding whitespace and cap the value at `max` characters
pub fn trim_and_cap(value: &str, max: usize) -> String {
    value.trim().chars().take(max).collect()
}

/// Require a non-blank text value, returning it trimmed and capped
pub fn require_text(field: &str, value: Option<&str>) -> Result<String, DomainError> {
    match value.map(|v| trim_and_cap(v, MAX_FIELD_LENGTH)) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::missing(field)),
    }
}

/// Optional text value; blank collapses to `None`
pub fn optional_text(value: Option<&str>, max: usize) -> Option<String> {
    value
        .map(|v| trim_and_cap(v, max))
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Quantities
// ============================================================================

/// A quantity as submitted by a form: JSON number or numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantityInput {
    Integer(i64),
    Fractional(f64),
    Text(String),
}

impl QuantityInput {
    /// Parse into a whole number, rejecting fractions and non-numeric text
    pub fn parse(&self, field: &str) -> Result<i64, DomainError> {
        match self {
            QuantityInput::Integer(n) => Ok(*n),
            QuantityInput::Fractional(_) => {
                Err(DomainError::validation(field, "must be a whole number"))
            }
            QuantityInput::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| DomainError::validation(field, "must be a whole number")),
        }
    }

    /// Parse and require a value between 1 and `MAX_QUANTITY`
    pub fn parse_positive(&self, field: &str) -> Result<i64, DomainError> {
        let quantity = self.parse(field)?;
        validate_positive_quantity(field, quantity)?;
        Ok(quantity)
    }
}

/// Validate that a quantity is greater than zero and at most `MAX_QUANTITY`
pub fn validate_positive_quantity(field: &str, quantity: i64) -> Result<(), DomainError> {
    if quantity <= 0 {
        return Err(DomainError::validation(field, "must be greater than zero"));
    }
    if quantity > MAX_QUANTITY {
        return Err(DomainError::validation(
            field,
            format!("must be at most {}", MAX_QUANTITY),
        ));
    }
    Ok(())
}

// ============================================================================
// Dates and times
// ============================================================================

/// Parse a timestamp from RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`
/// or a bare date (midnight UTC). Naive values are taken as UTC.
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, DomainError> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }
    Err(DomainError::validation(field, "is not a valid date/time"))
}

/// Parse a calendar date; full timestamps are accepted and truncated to their date
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DomainError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| parse_timestamp(field, value).map(|ts| ts.date_naive()))
        .map_err(|_| DomainError::validation(field, "is not a valid date"))
}

/// Require a timestamp field
pub fn require_timestamp(field: &str, value: Option<&str>) -> Result<DateTime<Utc>, DomainError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => parse_timestamp(field, v),
        _ => Err(DomainError::missing(field)),
    }
}
