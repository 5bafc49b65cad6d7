//! Typed model and record decoding for Neo4j change data capture.
//!
//! Records returned by the `db.cdc.*` procedures are first converted into
//! [`Value`] maps (see the `neo4j-types` crate) and then decoded here:
//!
//! ```
//! use cdc_core::{ChangeIdentifier, value::{value_map, Value}};
//!
//! let row = value_map([("id", Value::from("A3V1"))]);
//! let id = ChangeIdentifier::from_record(&row).unwrap();
//! assert_eq!(id.id(), "A3V1");
//! ```

mod decode;
pub mod error;
pub mod model;
pub mod value;

pub use error::{DecodeError, Result};
pub use model::*;
pub use value::{Value, ValueMap};
