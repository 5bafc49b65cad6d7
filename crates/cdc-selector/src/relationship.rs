use crate::builder::SelectorBuilder;
use crate::entity::{string_list, EntitySelector};
use cdc_core::{ChangeEvent, Event, Node, RelationshipEvent, Value, ValueMap};
use std::collections::BTreeSet;

/// Label and key filter on the start or end node of a relationship.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipNodeSelector {
    labels: BTreeSet<String>,
    key: ValueMap,
}

impl RelationshipNodeSelector {
    pub fn builder() -> RelationshipNodeSelectorBuilder {
        RelationshipNodeSelectorBuilder::default()
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn key(&self) -> &ValueMap {
        &self.key
    }

    /// True when neither labels nor key are set.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.key.is_empty()
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.labels.iter().all(|label| node.labels.contains(label))
            && (self.key.is_empty() || node.keys.values().flatten().any(|key| *key == self.key))
    }

    pub fn as_map(&self) -> ValueMap {
        let mut map = ValueMap::new();
        if !self.labels.is_empty() {
            map.insert("labels".into(), string_list(&self.labels));
        }
        if !self.key.is_empty() {
            map.insert("key".into(), Value::Map(self.key.clone()));
        }
        map
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelationshipNodeSelectorBuilder {
    selector: RelationshipNodeSelector,
}

impl RelationshipNodeSelectorBuilder {
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selector.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_key(mut self, key: ValueMap) -> Self {
        self.selector.key = key;
        self
    }

    pub fn build(self) -> RelationshipNodeSelector {
        self.selector
    }
}

/// Selects relationship changes by type, endpoints and key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipSelector {
    pub(crate) entity: EntitySelector,
    pub(crate) rel_type: Option<String>,
    pub(crate) start: RelationshipNodeSelector,
    pub(crate) end: RelationshipNodeSelector,
    pub(crate) key: ValueMap,
}

impl RelationshipSelector {
    pub fn builder() -> RelationshipSelectorBuilder {
        RelationshipSelectorBuilder::default()
    }

    pub fn entity(&self) -> &EntitySelector {
        &self.entity
    }

    pub fn rel_type(&self) -> Option<&str> {
        self.rel_type.as_deref()
    }

    pub fn start(&self) -> &RelationshipNodeSelector {
        &self.start
    }

    pub fn end(&self) -> &RelationshipNodeSelector {
        &self.end
    }

    pub fn key(&self) -> &ValueMap {
        &self.key
    }

    pub fn matches(&self, change: &ChangeEvent) -> bool {
        let Event::Relationship(event) = &change.event else {
            return false;
        };
        self.entity.matches(change)
            && self.type_matches(event)
            && self.start.matches(&event.start)
            && self.end.matches(&event.end)
            && self.key_matches(event)
    }

    fn type_matches(&self, event: &RelationshipEvent) -> bool {
        match &self.rel_type {
            Some(rel_type) => *rel_type == event.rel_type,
            None => true,
        }
    }

    fn key_matches(&self, event: &RelationshipEvent) -> bool {
        self.key.is_empty() || event.keys.contains(&self.key)
    }

    pub fn apply_properties(&self, change: ChangeEvent) -> ChangeEvent {
        self.entity.apply_properties(change)
    }

    pub fn as_map(&self) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("select".into(), "r".into());
        self.entity.write_fields(&mut map);
        if let Some(rel_type) = &self.rel_type {
            map.insert("type".into(), rel_type.as_str().into());
        }
        if !self.start.is_empty() {
            map.insert("start".into(), Value::Map(self.start.as_map()));
        }
        if !self.end.is_empty() {
            map.insert("end".into(), Value::Map(self.end.as_map()));
        }
        if !self.key.is_empty() {
            map.insert("key".into(), Value::Map(self.key.clone()));
        }
        map
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelationshipSelectorBuilder {
    selector: RelationshipSelector,
}

impl RelationshipSelectorBuilder {
    pub fn with_type(mut self, rel_type: impl Into<String>) -> Self {
        self.selector.rel_type = Some(rel_type.into());
        self
    }

    pub fn with_start(mut self, start: RelationshipNodeSelector) -> Self {
        self.selector.start = start;
        self
    }

    pub fn with_end(mut self, end: RelationshipNodeSelector) -> Self {
        self.selector.end = end;
        self
    }

    pub fn with_key(mut self, key: ValueMap) -> Self {
        self.selector.key = key;
        self
    }
}

impl SelectorBuilder for RelationshipSelectorBuilder {
    type Output = RelationshipSelector;

    fn entity(&mut self) -> &mut EntitySelector {
        &mut self.selector.entity
    }

    fn build(self) -> RelationshipSelector {
        self.selector
    }
}
