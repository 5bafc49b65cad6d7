//! Reverse conversion: Neo4j BoltType → Value
//!
//! Used when reading `db.cdc.*` procedure rows. Every property type Neo4j can
//! store has a `Value` counterpart, so the only failures are graph structures
//! and temporal values the driver cannot represent in chrono.

use crate::error::{Neo4jTypesError, Result};
use cdc_core::{Value, ValueMap};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use neo4rs::{BoltMap, BoltType};

/// Convert a Neo4j BoltType to a Value.
///
/// # Errors
///
/// Returns an error for:
/// - Node, Relation, UnboundedRelation, Path types (not property values)
/// - Dates and datetimes outside the range chrono supports
pub fn bolt_to_value(bolt: BoltType) -> Result<Value> {
    match bolt {
        BoltType::Null(_) => Ok(Value::Null),

        BoltType::Boolean(b) => Ok(Value::Boolean(b.value)),

        BoltType::Integer(i) => Ok(Value::Integer(i.value)),

        // NaN and infinity are legal property values and pass through
        BoltType::Float(f) => Ok(Value::Float(f.value)),

        BoltType::String(s) => Ok(Value::String(s.value)),

        BoltType::Bytes(b) => Ok(Value::Bytes(b.value.to_vec())),

        BoltType::List(list) => list
            .value
            .into_iter()
            .map(bolt_to_value)
            .collect::<Result<Vec<_>>>()
            .map(Value::List),

        BoltType::Map(map) => bolt_map_to_value_map(map).map(Value::Map),

        BoltType::Date(date) => {
            let naive_date: NaiveDate =
                date.try_into().map_err(|e| Neo4jTypesError::InvalidDate {
                    reason: format!("Failed to convert BoltDate: {e}"),
                })?;
            Ok(Value::Date(naive_date))
        }

        BoltType::Time(time) => {
            let (time, offset): (NaiveTime, FixedOffset) = time.into();
            Ok(Value::Time { time, offset })
        }

        BoltType::LocalTime(local_time) => Ok(Value::LocalTime(local_time.into())),

        BoltType::DateTime(dt) => {
            let dt: DateTime<FixedOffset> =
                dt.try_into()
                    .map_err(|e| Neo4jTypesError::InvalidDateTime {
                        reason: format!("Failed to convert BoltDateTime: {e}"),
                    })?;
            Ok(Value::DateTime(dt))
        }

        BoltType::LocalDateTime(local_dt) => {
            let naive_dt: NaiveDateTime =
                local_dt
                    .try_into()
                    .map_err(|e| Neo4jTypesError::InvalidDateTime {
                        reason: format!("Failed to convert BoltLocalDateTime: {e}"),
                    })?;
            Ok(Value::LocalDateTime(naive_dt))
        }

        // Zone ids are resolved to the offset in effect at that instant
        BoltType::DateTimeZoneId(dt_zone) => {
            let dt: DateTime<FixedOffset> =
                (&dt_zone)
                    .try_into()
                    .map_err(|e| Neo4jTypesError::InvalidDateTime {
                        reason: format!("Failed to convert BoltDateTimeZoneId: {e}"),
                    })?;
            Ok(Value::DateTime(dt))
        }

        BoltType::Duration(duration) => Ok(Value::Duration(duration.into())),

        BoltType::Point2D(point) => Ok(Value::Point {
            srid: point.sr_id.value,
            x: point.x.value,
            y: point.y.value,
            z: None,
        }),

        BoltType::Point3D(point) => Ok(Value::Point {
            srid: point.sr_id.value,
            x: point.x.value,
            y: point.y.value,
            z: Some(point.z.value),
        }),

        // These types cannot be converted to values
        BoltType::Node(_) => Err(Neo4jTypesError::UnsupportedBoltType {
            bolt_type: "Node".to_string(),
        }),

        BoltType::Relation(_) => Err(Neo4jTypesError::UnsupportedBoltType {
            bolt_type: "Relation".to_string(),
        }),

        BoltType::UnboundedRelation(_) => Err(Neo4jTypesError::UnsupportedBoltType {
            bolt_type: "UnboundedRelation".to_string(),
        }),

        BoltType::Path(_) => Err(Neo4jTypesError::UnsupportedBoltType {
            bolt_type: "Path".to_string(),
        }),
    }
}

/// Convert a Bolt map into a ValueMap. Keys are always strings in Bolt.
pub fn bolt_map_to_value_map(map: BoltMap) -> Result<ValueMap> {
    map.value
        .into_iter()
        .map(|(key, value)| Ok((key.value, bolt_to_value(value)?)))
        .collect()
}
