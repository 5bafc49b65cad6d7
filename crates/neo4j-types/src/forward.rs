//! Forward conversion: Value → Neo4j BoltType
//!
//! Used to pass selectors as `db.cdc.query` parameters. This module returns
//! `Result` for every conversion and never falls back to a default value.

use crate::error::{Neo4jTypesError, Result};
use cdc_core::{Value, ValueMap};
use neo4rs::{
    BoltBoolean, BoltBytes, BoltDate, BoltDateTime, BoltDuration, BoltFloat, BoltInteger,
    BoltList, BoltLocalDateTime, BoltLocalTime, BoltMap, BoltNull, BoltString, BoltTime,
    BoltType,
};

/// Convert a Value to a BoltType parameter.
///
/// # Errors
///
/// Returns an error if:
/// - Float value is NaN or infinite
/// - The value is a point (the driver offers no public point constructor)
pub fn value_to_bolt(value: &Value) -> Result<BoltType> {
    match value {
        Value::Null => Ok(BoltType::Null(BoltNull)),
        Value::Boolean(b) => Ok(BoltType::Boolean(BoltBoolean::new(*b))),
        Value::Integer(i) => Ok(BoltType::Integer(BoltInteger::new(*i))),

        // Float - error on NaN/Infinity instead of silent fallback
        Value::Float(f) => {
            if f.is_nan() {
                Err(Neo4jTypesError::NanFloat)
            } else if f.is_infinite() {
                Err(Neo4jTypesError::InfinityFloat)
            } else {
                Ok(BoltType::Float(BoltFloat::new(*f)))
            }
        }

        Value::String(s) => Ok(BoltType::String(BoltString::new(s))),
        Value::Bytes(b) => Ok(BoltType::Bytes(BoltBytes::new(b.clone().into()))),

        Value::List(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(value_to_bolt(item)?);
            }
            Ok(BoltType::List(list))
        }

        Value::Map(map) => value_map_to_bolt(map).map(BoltType::Map),

        Value::Date(d) => Ok(BoltType::Date(BoltDate::from(*d))),
        Value::Time { time, offset } => Ok(BoltType::Time(BoltTime::from((*time, *offset)))),
        Value::LocalTime(t) => Ok(BoltType::LocalTime(BoltLocalTime::from(*t))),
        Value::DateTime(dt) => Ok(BoltType::DateTime(BoltDateTime::from(*dt))),
        Value::LocalDateTime(dt) => Ok(BoltType::LocalDateTime(BoltLocalDateTime::from(*dt))),
        Value::Duration(d) => Ok(BoltType::Duration(BoltDuration::from(*d))),

        Value::Point { .. } => Err(Neo4jTypesError::UnsupportedValue {
            value_type: value.type_name().to_string(),
        }),
    }
}

/// Convert a ValueMap to a BoltMap.
pub fn value_map_to_bolt(map: &ValueMap) -> Result<BoltMap> {
    let mut bolt = BoltMap::new();
    for (key, value) in map {
        bolt.put(BoltString::new(key), value_to_bolt(value)?);
    }
    Ok(bolt)
}
