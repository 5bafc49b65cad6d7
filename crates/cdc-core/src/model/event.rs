use super::{
    ChangeIdentifier, EntityOperation, EntityState, EventType, Metadata, NodeState,
    RelationshipState,
};
use crate::decode;
use crate::error::Result;
use crate::value::ValueMap;
use serde::Serialize;
use std::collections::HashMap;

/// Node keys by label. A label can carry several key constraints, so each
/// label maps to a list of key-property maps. An empty map means the node has
/// no key constraints, not that it has no identity.
pub type NodeKeys = HashMap<String, Vec<ValueMap>>;

/// One captured change together with its position and transaction metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub id: ChangeIdentifier,
    pub tx_id: i64,
    pub seq: i32,
    pub metadata: Metadata,
    pub event: Event,
}

impl ChangeEvent {
    /// Decode a `db.cdc.query` result row.
    pub fn from_record(record: &ValueMap) -> Result<Self> {
        Ok(Self {
            id: ChangeIdentifier::from_record(record)?,
            tx_id: decode::require_i64(record, "txId")?,
            seq: decode::require_i32(record, "seq")?,
            metadata: Metadata::from_map(decode::require_map(record, "metadata")?)?,
            event: Event::from_map(decode::require_map(record, "event")?)?,
        })
    }

    /// Copy of this change carrying `event` instead of the current one.
    pub fn with_event(&self, event: Event) -> Self {
        Self {
            id: self.id.clone(),
            tx_id: self.tx_id,
            seq: self.seq,
            metadata: self.metadata.clone(),
            event,
        }
    }
}

/// The entity change itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "eventType")]
pub enum Event {
    #[serde(rename = "n")]
    Node(NodeEvent),
    #[serde(rename = "r")]
    Relationship(RelationshipEvent),
}

impl Event {
    pub fn from_map(map: &ValueMap) -> Result<Self> {
        match EventType::from_shorthand(&decode::require_string(map, "eventType")?)? {
            EventType::Node => NodeEvent::from_map(map).map(Self::Node),
            EventType::Relationship => RelationshipEvent::from_map(map).map(Self::Relationship),
        }
    }

    pub fn element_id(&self) -> &str {
        match self {
            Self::Node(e) => &e.element_id,
            Self::Relationship(e) => &e.element_id,
        }
    }

    pub fn event_type(&self) -> EventType {
        match self {
            Self::Node(_) => EventType::Node,
            Self::Relationship(_) => EventType::Relationship,
        }
    }

    pub fn operation(&self) -> EntityOperation {
        match self {
            Self::Node(e) => e.operation,
            Self::Relationship(e) => e.operation,
        }
    }

    pub fn before_properties(&self) -> Option<&ValueMap> {
        match self {
            Self::Node(e) => e.before.as_ref().map(EntityState::properties),
            Self::Relationship(e) => e.before.as_ref().map(EntityState::properties),
        }
    }

    pub fn after_properties(&self) -> Option<&ValueMap> {
        match self {
            Self::Node(e) => e.after.as_ref().map(EntityState::properties),
            Self::Relationship(e) => e.after.as_ref().map(EntityState::properties),
        }
    }

    /// Rebuild the before and after states with their property maps passed
    /// through `project`. Absent states stay absent.
    pub fn map_properties<F>(&self, project: F) -> Self
    where
        F: Fn(&ValueMap) -> ValueMap,
    {
        fn apply<S: EntityState>(state: &Option<S>, project: &impl Fn(&ValueMap) -> ValueMap) -> Option<S> {
            state
                .as_ref()
                .map(|s| s.with_properties(project(s.properties())))
        }

        match self {
            Self::Node(e) => Self::Node(NodeEvent {
                before: apply(&e.before, &project),
                after: apply(&e.after, &project),
                ..e.clone()
            }),
            Self::Relationship(e) => Self::Relationship(RelationshipEvent {
                before: apply(&e.before, &project),
                after: apply(&e.after, &project),
                ..e.clone()
            }),
        }
    }
}

/// Start or end node of a relationship event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub element_id: String,
    pub labels: Vec<String>,
    pub keys: NodeKeys,
}

impl Node {
    pub fn new(element_id: impl Into<String>, labels: Vec<String>, keys: NodeKeys) -> Self {
        Self {
            element_id: element_id.into(),
            labels,
            keys,
        }
    }

    pub(crate) fn from_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            element_id: decode::require_string(map, "elementId")?,
            labels: decode::get_string_list(map, "labels")?,
            keys: decode::get_node_keys(map)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEvent {
    pub element_id: String,
    pub operation: EntityOperation,
    /// Labels of the node at commit time, whatever the capture mode.
    pub labels: Vec<String>,
    pub keys: NodeKeys,
    pub before: Option<NodeState>,
    pub after: Option<NodeState>,
}

impl NodeEvent {
    pub(crate) fn from_map(map: &ValueMap) -> Result<Self> {
        let state = decode::require_map(map, "state")?;
        Ok(Self {
            element_id: decode::require_string(map, "elementId")?,
            operation: EntityOperation::from_shorthand(&decode::require_string(map, "operation")?)?,
            labels: decode::get_string_list(map, "labels")?,
            keys: decode::get_node_keys(map)?,
            before: decode::get_map(state, "before")?
                .map(NodeState::from_map)
                .transpose()?,
            after: decode::get_map(state, "after")?
                .map(NodeState::from_map)
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEvent {
    pub element_id: String,
    pub operation: EntityOperation,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub start: Node,
    pub end: Node,
    pub keys: Vec<ValueMap>,
    pub before: Option<RelationshipState>,
    pub after: Option<RelationshipState>,
}

impl RelationshipEvent {
    pub(crate) fn from_map(map: &ValueMap) -> Result<Self> {
        let state = decode::require_map(map, "state")?;
        Ok(Self {
            element_id: decode::require_string(map, "elementId")?,
            operation: EntityOperation::from_shorthand(&decode::require_string(map, "operation")?)?,
            rel_type: decode::require_string(map, "type")?,
            start: Node::from_map(decode::require_map(map, "start")?)?,
            end: Node::from_map(decode::require_map(map, "end")?)?,
            keys: decode::get_relationship_keys(map)?,
            before: decode::get_map(state, "before")?
                .map(RelationshipState::from_map)
                .transpose()?,
            after: decode::get_map(state, "after")?
                .map(RelationshipState::from_map)
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::value::{value_map, Value};

    fn metadata() -> Value {
        Value::Map(value_map([
            ("connectionType", Value::from("bolt")),
            ("captureMode", Value::from("FULL")),
            ("serverId", Value::from("srv-1")),
            ("databaseName", Value::from("neo4j")),
            ("txStartTime", Value::from("2024-03-01T09:15:00Z")),
            ("txCommitTime", Value::from("2024-03-01T09:15:01Z")),
        ]))
    }

    fn node_event(operation: &str, before: Value, after: Value) -> Value {
        Value::Map(value_map([
            ("eventType", Value::from("n")),
            ("elementId", Value::from("4:abc:0")),
            ("operation", Value::from(operation)),
            ("labels", Value::from(vec!["Person", "Employee"])),
            (
                "keys",
                Value::Map(value_map([(
                    "Person",
                    Value::List(vec![Value::Map(value_map([("id", 1)]))]),
                )])),
            ),
            ("state", Value::Map(value_map([("before", before), ("after", after)]))),
        ]))
    }

    fn record(event: Value) -> ValueMap {
        value_map([
            ("id", Value::from("CHANGE-1")),
            ("txId", Value::from(12)),
            ("seq", Value::from(0)),
            ("metadata", metadata()),
            ("event", event),
        ])
    }

    fn node_state(properties: ValueMap) -> Value {
        Value::Map(value_map([
            ("labels", Value::from(vec!["Person", "Employee"])),
            ("properties", Value::Map(properties)),
        ]))
    }

    #[test]
    fn test_decode_node_create() {
        let after = node_state(value_map([("id", Value::from(1)), ("name", Value::from("John"))]));
        let change = ChangeEvent::from_record(&record(node_event("c", Value::Null, after))).unwrap();

        assert_eq!(change.id, ChangeIdentifier::new("CHANGE-1"));
        assert_eq!(change.tx_id, 12);
        assert_eq!(change.seq, 0);
        assert_eq!(change.event.event_type(), EventType::Node);
        assert_eq!(change.event.operation(), EntityOperation::Create);
        assert_eq!(change.event.element_id(), "4:abc:0");
        assert!(change.event.before_properties().is_none());
        assert_eq!(
            change.event.after_properties().unwrap()["name"],
            Value::from("John")
        );

        let Event::Node(node) = &change.event else {
            panic!("expected a node event");
        };
        assert_eq!(node.labels, vec!["Person", "Employee"]);
        assert_eq!(node.keys["Person"], vec![value_map([("id", 1)])]);
    }

    #[test]
    fn test_decode_relationship_with_legacy_keys() {
        let event = Value::Map(value_map([
            ("eventType", Value::from("r")),
            ("elementId", Value::from("5:abc:7")),
            ("operation", Value::from("U")),
            ("type", Value::from("WORKS_FOR")),
            (
                "start",
                Value::Map(value_map([
                    ("elementId", Value::from("4:abc:0")),
                    ("labels", Value::from(vec!["Person"])),
                    (
                        "keys",
                        Value::Map(value_map([("Person", Value::Map(value_map([("id", 1)])))])),
                    ),
                ])),
            ),
            (
                "end",
                Value::Map(value_map([
                    ("elementId", Value::from("4:abc:1")),
                    ("labels", Value::from(vec!["Company"])),
                ])),
            ),
            ("keys", Value::Map(value_map([("since", 2019)]))),
            (
                "state",
                Value::Map(value_map([
                    ("before", Value::Map(value_map([("properties", Value::Map(value_map([("since", 2019)])))]))),
                    ("after", Value::Map(value_map([("properties", Value::Map(value_map([("since", 2020)])))]))),
                ])),
            ),
        ]));
        let change = ChangeEvent::from_record(&record(event)).unwrap();

        let Event::Relationship(rel) = &change.event else {
            panic!("expected a relationship event");
        };
        assert_eq!(rel.operation, EntityOperation::Update);
        assert_eq!(rel.rel_type, "WORKS_FOR");
        assert_eq!(rel.start.keys["Person"], vec![value_map([("id", 1)])]);
        assert!(rel.end.keys.is_empty());
        assert_eq!(rel.keys, vec![value_map([("since", 2019)])]);
        assert_eq!(rel.after.as_ref().unwrap().properties["since"], Value::from(2020));
    }

    #[test]
    fn test_unknown_operation() {
        let err = ChangeEvent::from_record(&record(node_event("x", Value::Null, Value::Null)))
            .unwrap_err();
        assert_eq!(err, DecodeError::UnknownOperation("x".to_string()));
    }

    #[test]
    fn test_bad_record_does_not_affect_next() {
        let bad = record(Value::from("not a map"));
        let good = record(node_event("d", node_state(ValueMap::new()), Value::Null));

        assert!(matches!(
            ChangeEvent::from_record(&bad),
            Err(DecodeError::InvalidShape { .. })
        ));
        let change = ChangeEvent::from_record(&good).unwrap();
        assert_eq!(change.event.operation(), EntityOperation::Delete);
        assert!(change.event.before_properties().unwrap().is_empty());
    }

    #[test]
    fn test_map_properties_keeps_absent_states() {
        let after = node_state(value_map([("id", Value::from(1)), ("name", Value::from("John"))]));
        let change = ChangeEvent::from_record(&record(node_event("c", Value::Null, after))).unwrap();

        let projected = change.event.map_properties(|props| {
            props
                .iter()
                .filter(|(k, _)| k.as_str() == "id")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        });
        assert!(projected.before_properties().is_none());
        assert_eq!(projected.after_properties().unwrap(), &value_map([("id", 1)]));
        assert_eq!(projected.element_id(), change.event.element_id());
    }

    #[test]
    fn test_serialize_event_tag() {
        let change = ChangeEvent::from_record(&record(node_event(
            "c",
            Value::Null,
            node_state(ValueMap::new()),
        )))
        .unwrap();
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["event"]["eventType"], "n");
        assert_eq!(json["event"]["operation"], "CREATE");
        assert_eq!(json["txId"], 12);
    }
}
