use crate::builder::SelectorBuilder;
use cdc_core::{ChangeEvent, EntityOperation, Event, Value, ValueMap};
use std::collections::BTreeSet;

/// Include-properties entry that keeps every property.
pub const ALL_PROPERTIES: &str = "*";

/// Filters shared by every selector kind.
///
/// Built through [`EntitySelector::builder`]. A selector with no filters set
/// matches every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySelector {
    pub(crate) operation: Option<EntityOperation>,
    pub(crate) changes_to: BTreeSet<String>,
    pub(crate) executing_user: Option<String>,
    pub(crate) authenticated_user: Option<String>,
    pub(crate) tx_metadata: ValueMap,
    pub(crate) include_properties: BTreeSet<String>,
    pub(crate) exclude_properties: BTreeSet<String>,
}

impl EntitySelector {
    pub fn builder() -> EntitySelectorBuilder {
        EntitySelectorBuilder::default()
    }

    pub fn operation(&self) -> Option<EntityOperation> {
        self.operation
    }

    pub fn changes_to(&self) -> &BTreeSet<String> {
        &self.changes_to
    }

    pub fn executing_user(&self) -> Option<&str> {
        self.executing_user.as_deref()
    }

    pub fn authenticated_user(&self) -> Option<&str> {
        self.authenticated_user.as_deref()
    }

    pub fn tx_metadata(&self) -> &ValueMap {
        &self.tx_metadata
    }

    pub fn include_properties(&self) -> &BTreeSet<String> {
        &self.include_properties
    }

    pub fn exclude_properties(&self) -> &BTreeSet<String> {
        &self.exclude_properties
    }

    /// Operation, changed-property and user/metadata checks.
    pub fn matches(&self, change: &ChangeEvent) -> bool {
        self.operation_matches(&change.event)
            && self.changes_match(&change.event)
            && self.metadata_matches(change)
    }

    fn operation_matches(&self, event: &Event) -> bool {
        match self.operation {
            Some(op) => op == event.operation(),
            None => true,
        }
    }

    fn changes_match(&self, event: &Event) -> bool {
        if self.changes_to.is_empty() {
            return true;
        }

        let empty = ValueMap::new();
        let before = event.before_properties().unwrap_or(&empty);
        let after = event.after_properties().unwrap_or(&empty);

        match event.operation() {
            EntityOperation::Create => self.changes_to.iter().all(|p| after.contains_key(p)),
            EntityOperation::Delete => self.changes_to.iter().all(|p| before.contains_key(p)),
            EntityOperation::Update => self.changes_to.iter().all(|p| {
                (before.contains_key(p) || after.contains_key(p)) && before.get(p) != after.get(p)
            }),
        }
    }

    fn metadata_matches(&self, change: &ChangeEvent) -> bool {
        let metadata = &change.metadata;
        if let Some(user) = &self.authenticated_user {
            if metadata.authenticated_user.as_ref() != Some(user) {
                return false;
            }
        }
        if let Some(user) = &self.executing_user {
            if metadata.executing_user.as_ref() != Some(user) {
                return false;
            }
        }
        self.tx_metadata
            .iter()
            .all(|(key, value)| metadata.tx_metadata.get(key) == Some(value))
    }

    /// Drop excluded properties and keep only included ones.
    ///
    /// With no include or exclude set the change is returned as is.
    pub fn apply_properties(&self, change: ChangeEvent) -> ChangeEvent {
        if self.include_properties.is_empty() && self.exclude_properties.is_empty() {
            return change;
        }

        let event = change.event.map_properties(|props| self.filter_properties(props));
        change.with_event(event)
    }

    fn filter_properties(&self, properties: &ValueMap) -> ValueMap {
        let include_all = self.include_properties.is_empty()
            || self.include_properties.contains(ALL_PROPERTIES);

        properties
            .iter()
            .filter(|(name, _)| !self.exclude_properties.contains(*name))
            .filter(|(name, _)| include_all || self.include_properties.contains(*name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Write the shared wire fields. Unset filters are left out.
    pub(crate) fn write_fields(&self, map: &mut ValueMap) {
        if let Some(op) = self.operation {
            map.insert("operation".into(), op.shorthand().into());
        }
        if !self.changes_to.is_empty() {
            map.insert("changesTo".into(), string_list(&self.changes_to));
        }
        if let Some(user) = &self.authenticated_user {
            map.insert("authenticatedUser".into(), user.as_str().into());
        }
        if let Some(user) = &self.executing_user {
            map.insert("executingUser".into(), user.as_str().into());
        }
        if !self.tx_metadata.is_empty() {
            map.insert("txMetadata".into(), Value::Map(self.tx_metadata.clone()));
        }
    }

    /// Parameter map for `db.cdc.query`.
    pub fn as_map(&self) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("select".into(), "e".into());
        self.write_fields(&mut map);
        map
    }
}

pub(crate) fn string_list(values: &BTreeSet<String>) -> Value {
    Value::List(values.iter().map(|v| Value::from(v.as_str())).collect())
}

#[derive(Debug, Clone, Default)]
pub struct EntitySelectorBuilder {
    selector: EntitySelector,
}

impl SelectorBuilder for EntitySelectorBuilder {
    type Output = EntitySelector;

    fn entity(&mut self) -> &mut EntitySelector {
        &mut self.selector
    }

    fn build(self) -> EntitySelector {
        self.selector
    }
}
