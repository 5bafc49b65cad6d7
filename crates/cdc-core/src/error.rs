//! Error types for decoding change data capture records.
//!
//! Decoding fails fast per record. A failed record never affects how the next
//! record is decoded.

use thiserror::Error;

/// Errors that can occur while decoding a record into the typed model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Required field is missing or null.
    #[error("Required field '{field}' is missing")]
    MissingField { field: String },

    /// A value has a different type than the record shape requires.
    #[error("Invalid shape for '{field}': expected {expected}, got {actual}")]
    InvalidShape {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Operation shorthand is not one of `c`, `u` or `d`.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Event type shorthand is not one of `n` or `r`.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// Capture mode is not one of `DIFF` or `FULL`.
    #[error("Unknown capture mode: {0}")]
    UnknownCaptureMode(String),

    /// Timestamp string could not be parsed.
    #[error("Invalid timestamp for '{field}': {value}")]
    InvalidTimestamp { field: String, value: String },

    /// Numeric value does not fit the target type.
    #[error("Numeric overflow converting {value} to {target_type} for '{field}'")]
    NumericOverflow {
        field: String,
        value: i64,
        target_type: &'static str,
    },
}

impl DecodeError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }

    pub(crate) fn shape(field: &str, expected: &'static str, actual: &'static str) -> Self {
        Self::InvalidShape {
            field: field.to_string(),
            expected,
            actual,
        }
    }
}

/// Result type for record decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;
