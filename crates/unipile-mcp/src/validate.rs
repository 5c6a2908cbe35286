//! Argument validation shared by the Unipile request parameters.
//!
//! Unipile rejects malformed requests with terse errors, so the obvious
//! mistakes (out-of-range page sizes, non-RFC 3339 timestamps, blank
//! identifiers) are caught before any HTTP call is made.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// A request parameter failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid '{field}': {message}")]
pub struct ValidationError {
    /// Parameter name as it appears in the tool schema.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result of a validation check.
pub type ValidationResult = Result<(), ValidationError>;

/// Check an optional page size against an inclusive range.
pub fn limit(field: &str, value: Option<u32>, min: u32, max: u32) -> ValidationResult {
    match value {
        Some(v) if v < min || v > max => Err(ValidationError::new(
            field,
            format!("must be between {} and {}, got {}", min, max, v),
        )),
        _ => Ok(()),
    }
}

/// Check that an optional value is an RFC 3339 (ISO 8601) datetime in UTC.
pub fn datetime(field: &str, value: Option<&str>) -> ValidationResult {
    let raw = match value {
        Some(raw) => raw,
        None => return Ok(()),
    };

    let parsed = chrono::DateTime::parse_from_rfc3339(raw).map_err(|e| {
        ValidationError::new(
            field,
            format!("'{}' is not an ISO 8601 UTC datetime ({})", raw, e),
        )
    })?;

    if parsed.offset().local_minus_utc() != 0 {
        let utc = parsed
            .with_timezone(&chrono::Utc)
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        return Err(ValidationError::new(
            field,
            format!("'{}' must be in UTC, e.g. {}", raw, utc),
        ));
    }
    Ok(())
}

/// Check that a required identifier or text is not blank.
pub fn required(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// Check that every entry of an optional list is a JSON object.
pub fn objects(field: &str, values: Option<&[serde_json::Value]>) -> ValidationResult {
    match values {
        Some(items) => match items.iter().position(|v| !v.is_object()) {
            Some(idx) => Err(ValidationError::new(
                field,
                format!("entry {} must be an object", idx),
            )),
            None => Ok(()),
        },
        None => Ok(()),
    }
}

/// Deserialize an optional string, mapping blank strings to `None`.
///
/// Clients frequently send `""` for "not set".
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
