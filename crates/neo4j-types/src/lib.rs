//! Neo4j/Bolt type conversions for change data capture values.
//!
//! This crate converts between the driver's `BoltType` and the
//! driver-independent [`cdc_core::Value`] in both directions.
//!
//! # Modules
//!
//! - [`forward`] - `Value` → `BoltType`, for query parameters
//! - [`reverse`] - `BoltType` → `Value`, for procedure result rows
//! - [`error`] - Error types for conversion failures
//!
//! Graph structures (nodes, relationships, paths) are never part of a change
//! record and are rejected with an explicit error.

pub mod error;
pub mod forward;
pub mod reverse;

pub use error::{Neo4jTypesError, Result};
pub use forward::{value_map_to_bolt, value_to_bolt};
pub use reverse::{bolt_map_to_value_map, bolt_to_value};
