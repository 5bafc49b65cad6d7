use cdc_core::value::value_map;
use cdc_core::{ChangeEvent, Value, ValueMap};

/// A `db.cdc.query` row for a created node with a single label.
pub(crate) fn node_change_record(id: &str, label: &str) -> ValueMap {
    let after = value_map([
        ("labels", Value::from(vec![label])),
        (
            "properties",
            Value::Map(value_map([
                ("name", Value::from("John")),
                ("password", Value::from("secret")),
            ])),
        ),
    ]);

    value_map([
        ("id", Value::from(id)),
        ("txId", Value::from(3)),
        ("seq", Value::from(0)),
        (
            "metadata",
            Value::Map(value_map([
                ("connectionType", "bolt"),
                ("captureMode", "FULL"),
                ("serverId", "srv-1"),
                ("txStartTime", "2024-03-01T09:15:00Z"),
                ("txCommitTime", "2024-03-01T09:15:01Z"),
            ])),
        ),
        (
            "event",
            Value::Map(value_map([
                ("eventType", Value::from("n")),
                ("elementId", Value::from("4:db:1")),
                ("operation", Value::from("c")),
                ("labels", Value::from(vec![label])),
                (
                    "keys",
                    Value::Map(value_map([(
                        label,
                        Value::List(vec![Value::Map(value_map([("name", "John")]))]),
                    )])),
                ),
                (
                    "state",
                    Value::Map(value_map([("before", Value::Null), ("after", Value::Map(after))])),
                ),
            ])),
        ),
    ])
}

pub(crate) fn node_change(id: &str, label: &str) -> ChangeEvent {
    ChangeEvent::from_record(&node_change_record(id, label)).unwrap()
}
