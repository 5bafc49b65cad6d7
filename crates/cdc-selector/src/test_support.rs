//! Change fixtures shared by the unit tests.

use cdc_core::value::value_map;
use cdc_core::{
    CaptureMode, ChangeEvent, ChangeIdentifier, EntityOperation, Event, Metadata, Node, NodeEvent,
    NodeKeys, NodeState, RelationshipEvent, RelationshipState, Value, ValueMap,
};
use chrono::{DateTime, FixedOffset};

pub fn props<K, V, I>(entries: I) -> ValueMap
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    value_map(entries)
}

fn timestamp(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

pub fn metadata(executing_user: &str, authenticated_user: &str, tx_metadata: ValueMap) -> Metadata {
    Metadata {
        executing_user: Some(executing_user.to_string()),
        authenticated_user: Some(authenticated_user.to_string()),
        connection_type: "bolt".to_string(),
        connection_client: Some("127.0.0.1:51320".to_string()),
        connection_server: Some("127.0.0.1:7687".to_string()),
        database_name: "neo4j".to_string(),
        capture_mode: CaptureMode::Full,
        server_id: "srv-1".to_string(),
        tx_start_time: timestamp("2024-03-01T09:15:00Z"),
        tx_commit_time: timestamp("2024-03-01T09:15:01Z"),
        tx_metadata,
        additional_entries: ValueMap::new(),
    }
}

fn change(event: Event) -> ChangeEvent {
    ChangeEvent {
        id: ChangeIdentifier::new("CHANGE-1"),
        tx_id: 7,
        seq: 0,
        metadata: metadata("neo4j", "neo4j", ValueMap::new()),
        event,
    }
}

fn person_keys() -> NodeKeys {
    NodeKeys::from([
        ("Person".to_string(), vec![value_map([("id", 1)])]),
        (
            "Employee".to_string(),
            vec![value_map([("id", Value::from(5)), ("role", Value::from("manager"))])],
        ),
    ])
}

/// A `Person:Employee` node change with keys under both labels.
pub fn node_change(
    operation: EntityOperation,
    before: Option<ValueMap>,
    after: Option<ValueMap>,
) -> ChangeEvent {
    let labels = vec!["Person".to_string(), "Employee".to_string()];
    change(Event::Node(NodeEvent {
        element_id: "4:db:1".to_string(),
        operation,
        labels: labels.clone(),
        keys: person_keys(),
        before: before.map(|p| NodeState::new(labels.clone(), p)),
        after: after.map(|p| NodeState::new(labels.clone(), p)),
    }))
}

/// `(:Person {id: 1})-[:WORKS_FOR {contractId: 42}]->(:Company)`.
pub fn relationship_change(operation: EntityOperation) -> ChangeEvent {
    let after = value_map([("contractId", Value::from(42)), ("since", Value::from(2020))]);
    change(Event::Relationship(RelationshipEvent {
        element_id: "5:db:9".to_string(),
        operation,
        rel_type: "WORKS_FOR".to_string(),
        start: Node::new("4:db:1", vec!["Person".to_string()], person_keys()),
        end: Node::new("4:db:2", vec!["Company".to_string()], NodeKeys::new()),
        keys: vec![value_map([("contractId", 42)])],
        before: None,
        after: Some(RelationshipState::new(after)),
    }))
}
