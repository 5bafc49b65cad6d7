//! Error types for Neo4j type conversions.
//!
//! Unexpected cases return explicit errors instead of falling back to a
//! default value.

use thiserror::Error;

/// Errors that can occur during Neo4j type conversions.
#[derive(Debug, Error)]
pub enum Neo4jTypesError {
    /// NaN float values cannot be sent as parameters.
    #[error("NaN float values cannot be represented in Neo4j")]
    NanFloat,

    /// Infinity float values cannot be sent as parameters.
    #[error("Infinity float values cannot be represented in Neo4j")]
    InfinityFloat,

    /// Neo4j type cannot be converted to a value.
    #[error("Neo4j {bolt_type} cannot be converted to a value")]
    UnsupportedBoltType { bolt_type: String },

    /// Value cannot be sent as a query parameter.
    #[error("{value_type} values cannot be sent as query parameters")]
    UnsupportedValue { value_type: String },

    /// Invalid date value.
    #[error("Invalid date: {reason}")]
    InvalidDate { reason: String },

    /// Invalid datetime value.
    #[error("Invalid datetime: {reason}")]
    InvalidDateTime { reason: String },
}

/// Result type for Neo4j type conversions.
pub type Result<T> = std::result::Result<T, Neo4jTypesError>;
