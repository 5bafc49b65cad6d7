use crate::builder::SelectorBuilder;
use crate::entity::{string_list, EntitySelector};
use cdc_core::{ChangeEvent, Event, NodeEvent, Value, ValueMap};
use std::collections::BTreeSet;

/// Selects node changes by label and key on top of the shared filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSelector {
    pub(crate) entity: EntitySelector,
    pub(crate) labels: BTreeSet<String>,
    pub(crate) key: ValueMap,
}

impl NodeSelector {
    pub fn builder() -> NodeSelectorBuilder {
        NodeSelectorBuilder::default()
    }

    pub fn entity(&self) -> &EntitySelector {
        &self.entity
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn key(&self) -> &ValueMap {
        &self.key
    }

    pub fn matches(&self, change: &ChangeEvent) -> bool {
        let Event::Node(event) = &change.event else {
            return false;
        };
        self.entity.matches(change) && self.labels_match(event) && self.key_matches(event)
    }

    /// Every selected label must be on the node; extra labels are fine.
    fn labels_match(&self, event: &NodeEvent) -> bool {
        self.labels.iter().all(|label| event.labels.contains(label))
    }

    /// The key must equal one of the node's key maps under any label.
    fn key_matches(&self, event: &NodeEvent) -> bool {
        self.key.is_empty() || event.keys.values().flatten().any(|key| *key == self.key)
    }

    pub fn apply_properties(&self, change: ChangeEvent) -> ChangeEvent {
        self.entity.apply_properties(change)
    }

    pub fn as_map(&self) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("select".into(), "n".into());
        self.entity.write_fields(&mut map);
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
pub struct NodeSelectorBuilder {
    selector: NodeSelector,
}

impl NodeSelectorBuilder {
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
}

impl SelectorBuilder for NodeSelectorBuilder {
    type Output = NodeSelector;

    fn entity(&mut self) -> &mut EntitySelector {
        &mut self.selector.entity
    }

    fn build(self) -> NodeSelector {
        self.selector
    }
}
