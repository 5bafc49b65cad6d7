//! Loosely typed values as they arrive from the change data capture procedures.
//!
//! `Value` is the driver-independent representation of a Cypher value. Records
//! returned by `db.cdc.*` procedures are converted into `Value` maps first and
//! then decoded into the typed model in [`crate::model`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// A string-keyed map of values, the shape of every record and property map.
pub type ValueMap = HashMap<String, Value>;

/// A Cypher value.
///
/// Equality is structural and type-strict: `Integer(1)` is not equal to
/// `Float(1.0)`, and two maps are equal when they hold the same keys with equal
/// values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,

    /// Boolean value
    Boolean(bool),

    /// 64-bit signed integer (Cypher INTEGER)
    Integer(i64),

    /// 64-bit floating point (Cypher FLOAT)
    Float(f64),

    /// String value
    String(String),

    /// Byte array
    Bytes(Vec<u8>),

    /// List of values
    List(Vec<Value>),

    /// String-keyed map of values
    Map(ValueMap),

    /// Calendar date without a time zone
    Date(NaiveDate),

    /// Time of day with a UTC offset
    Time {
        /// Local time of day
        time: NaiveTime,
        /// Offset from UTC
        #[serde(serialize_with = "serialize_offset")]
        offset: FixedOffset,
    },

    /// Time of day without a time zone
    LocalTime(NaiveTime),

    /// Instant with a UTC offset
    DateTime(DateTime<FixedOffset>),

    /// Date and time without a time zone
    LocalDateTime(NaiveDateTime),

    /// Duration
    Duration(std::time::Duration),

    /// Spatial point, 2D when `z` is `None`
    Point {
        /// Spatial reference identifier
        srid: i64,
        /// X coordinate (or longitude)
        x: f64,
        /// Y coordinate (or latitude)
        y: f64,
        /// Z coordinate (or height)
        z: Option<f64>,
    },
}

impl Value {
    /// Name of the value's type, used in shape error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::Bytes(_) => "Bytes",
            Self::List(_) => "List",
            Self::Map(_) => "Map",
            Self::Date(_) => "Date",
            Self::Time { .. } => "Time",
            Self::LocalTime(_) => "LocalTime",
            Self::DateTime(_) => "DateTime",
            Self::LocalDateTime(_) => "LocalDateTime",
            Self::Duration(_) => "Duration",
            Self::Point { .. } => "Point",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a list reference.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Try to get this value as a map reference.
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "'{s}'"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {}", map[key])?;
                }
                write!(f, "}}")
            }
            Self::Date(d) => write!(f, "date('{d}')"),
            Self::Time { time, offset } => write!(f, "time('{time}{offset}')"),
            Self::LocalTime(t) => write!(f, "localtime('{t}')"),
            Self::DateTime(dt) => write!(f, "datetime('{}')", dt.to_rfc3339()),
            Self::LocalDateTime(dt) => write!(f, "localdatetime('{dt}')"),
            Self::Duration(d) => write!(f, "duration({}s)", d.as_secs_f64()),
            Self::Point { srid, x, y, z } => match z {
                Some(z) => write!(f, "point({{srid: {srid}, x: {x}, y: {y}, z: {z}}})"),
                None => write!(f, "point({{srid: {srid}, x: {x}, y: {y}}})"),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

fn serialize_offset<S: serde::Serializer>(
    offset: &FixedOffset,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_i32(offset.local_minus_utc())
}

/// Build a [`ValueMap`] from key-value pairs.
///
/// ```
/// use cdc_core::value::{value_map, Value};
///
/// let key = value_map([("id", Value::from(1)), ("role", Value::from("manager"))]);
/// assert_eq!(key.len(), 2);
/// ```
pub fn value_map<K, V, I>(entries: I) -> ValueMap
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
