//! Checked accessors over loosely typed records.
//!
//! Every accessor validates the runtime type of the value it reads and reports
//! an [`DecodeError::InvalidShape`] naming the expected type on mismatch. A
//! field holding `Null` is treated the same as a missing field.

use crate::error::{DecodeError, Result};
use crate::model::NodeKeys;
use crate::value::{Value, ValueMap};
use chrono::{DateTime, FixedOffset};

/// Layout used by the server for `txStartTime`/`txCommitTime` when sent as text.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%#z";

pub(crate) fn get<'a>(map: &'a ValueMap, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

pub(crate) fn require<'a>(map: &'a ValueMap, key: &str) -> Result<&'a Value> {
    get(map, key).ok_or_else(|| DecodeError::missing(key))
}

pub(crate) fn expect_map<'a>(value: &'a Value, field: &str) -> Result<&'a ValueMap> {
    value
        .as_map()
        .ok_or_else(|| DecodeError::shape(field, "Map", value.type_name()))
}

pub(crate) fn expect_string(value: &Value, field: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DecodeError::shape(field, "String", value.type_name()))
}

pub(crate) fn get_string(map: &ValueMap, key: &str) -> Result<Option<String>> {
    get(map, key).map(|v| expect_string(v, key)).transpose()
}

pub(crate) fn require_string(map: &ValueMap, key: &str) -> Result<String> {
    expect_string(require(map, key)?, key)
}

pub(crate) fn require_i64(map: &ValueMap, key: &str) -> Result<i64> {
    let value = require(map, key)?;
    value
        .as_i64()
        .ok_or_else(|| DecodeError::shape(key, "Integer", value.type_name()))
}

pub(crate) fn require_i32(map: &ValueMap, key: &str) -> Result<i32> {
    let value = require_i64(map, key)?;
    i32::try_from(value).map_err(|_| DecodeError::NumericOverflow {
        field: key.to_string(),
        value,
        target_type: "i32",
    })
}

pub(crate) fn get_map<'a>(map: &'a ValueMap, key: &str) -> Result<Option<&'a ValueMap>> {
    get(map, key).map(|v| expect_map(v, key)).transpose()
}

pub(crate) fn require_map<'a>(map: &'a ValueMap, key: &str) -> Result<&'a ValueMap> {
    expect_map(require(map, key)?, key)
}

/// Read a list of strings. A missing list reads as empty.
pub(crate) fn get_string_list(map: &ValueMap, key: &str) -> Result<Vec<String>> {
    let Some(value) = get(map, key) else {
        return Ok(Vec::new());
    };
    let items = value
        .as_list()
        .ok_or_else(|| DecodeError::shape(key, "List", value.type_name()))?;
    items.iter().map(|item| expect_string(item, key)).collect()
}

/// Read a timestamp given either as a temporal value or as text.
pub(crate) fn get_timestamp(map: &ValueMap, key: &str) -> Result<Option<DateTime<FixedOffset>>> {
    let Some(value) = get(map, key) else {
        return Ok(None);
    };
    match value {
        Value::DateTime(dt) => Ok(Some(*dt)),
        Value::LocalDateTime(naive) => Ok(Some(naive.and_utc().fixed_offset())),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .or_else(|_| DateTime::parse_from_str(s, TIMESTAMP_FORMAT))
            .map(Some)
            .map_err(|_| DecodeError::InvalidTimestamp {
                field: key.to_string(),
                value: s.clone(),
            }),
        other => Err(DecodeError::shape(key, "DateTime", other.type_name())),
    }
}

pub(crate) fn require_timestamp(map: &ValueMap, key: &str) -> Result<DateTime<FixedOffset>> {
    get_timestamp(map, key)?.ok_or_else(|| DecodeError::missing(key))
}

/// Convert a list of maps, skipping null elements.
fn list_of_maps(items: &[Value], field: &str) -> Result<Vec<ValueMap>> {
    items
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| expect_map(item, field).cloned())
        .collect()
}

/// Read node keys, accepting both wire shapes.
///
/// Servers before 5.15 send `{label: {prop: value}}`, later servers send
/// `{label: [{prop: value}, ...]}` so a label can carry several key
/// constraints. The shape is taken from the first value and every other value
/// must follow it.
pub(crate) fn get_node_keys(map: &ValueMap) -> Result<NodeKeys> {
    let Some(value) = get(map, "keys") else {
        return Ok(NodeKeys::new());
    };
    let keys = expect_map(value, "keys")?;
    let Some(first) = keys.values().next() else {
        return Ok(NodeKeys::new());
    };

    match first {
        Value::Map(_) => keys
            .iter()
            .map(|(label, key)| {
                let field = format!("keys.{label}");
                Ok((label.clone(), vec![expect_map(key, &field)?.clone()]))
            })
            .collect(),
        Value::List(_) => keys
            .iter()
            .map(|(label, key)| {
                let field = format!("keys.{label}");
                let items = key
                    .as_list()
                    .ok_or_else(|| DecodeError::shape(&field, "List", key.type_name()))?;
                Ok((label.clone(), list_of_maps(items, &field)?))
            })
            .collect(),
        other => Err(DecodeError::shape("keys", "Map or List", other.type_name())),
    }
}

/// Read relationship keys, accepting a single map (legacy) or a list of maps.
pub(crate) fn get_relationship_keys(map: &ValueMap) -> Result<Vec<ValueMap>> {
    match get(map, "keys") {
        None => Ok(Vec::new()),
        Some(Value::Map(key)) if key.is_empty() => Ok(Vec::new()),
        Some(Value::Map(key)) => Ok(vec![key.clone()]),
        Some(Value::List(items)) => list_of_maps(items, "keys"),
        Some(other) => Err(DecodeError::shape("keys", "Map or List", other.type_name())),
    }
}
