//! Selectors over change events.
//!
//! A selector does two jobs. Its [`Selector::as_map`] form is sent to the
//! server as a `db.cdc.query` parameter, and the same object re-checks and
//! projects the events that come back:
//!
//! ```
//! use cdc_selector::{NodeSelector, Selector, SelectorBuilder};
//!
//! let selector: Selector = NodeSelector::builder()
//!     .with_labels(["Person"])
//!     .excluding_properties(["password"])
//!     .build()
//!     .into();
//! assert!(selector.as_map().contains_key("labels"));
//! ```
//!
//! Selectors never fail. A filter value of a different type than the stored
//! value simply does not match.

mod builder;
mod entity;
mod node;
mod relationship;

#[cfg(test)]
mod test_support;

pub use builder::SelectorBuilder;
pub use entity::{EntitySelector, EntitySelectorBuilder, ALL_PROPERTIES};
pub use node::{NodeSelector, NodeSelectorBuilder};
pub use relationship::{
    RelationshipNodeSelector, RelationshipNodeSelectorBuilder, RelationshipSelector,
    RelationshipSelectorBuilder,
};

use cdc_core::{ChangeEvent, Value, ValueMap};
use std::fmt;

/// Any top-level selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Entity(EntitySelector),
    Node(NodeSelector),
    Relationship(RelationshipSelector),
}

impl Selector {
    /// Filters common to every variant.
    pub fn entity(&self) -> &EntitySelector {
        match self {
            Self::Entity(s) => s,
            Self::Node(s) => &s.entity,
            Self::Relationship(s) => &s.entity,
        }
    }

    pub fn matches(&self, change: &ChangeEvent) -> bool {
        match self {
            Self::Entity(s) => s.matches(change),
            Self::Node(s) => s.matches(change),
            Self::Relationship(s) => s.matches(change),
        }
    }

    pub fn apply_properties(&self, change: ChangeEvent) -> ChangeEvent {
        self.entity().apply_properties(change)
    }

    /// Wire form consumed by `db.cdc.query`. Unset filters are omitted.
    pub fn as_map(&self) -> ValueMap {
        match self {
            Self::Entity(s) => s.as_map(),
            Self::Node(s) => s.as_map(),
            Self::Relationship(s) => s.as_map(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Map(self.as_map()))
    }
}

impl From<EntitySelector> for Selector {
    fn from(selector: EntitySelector) -> Self {
        Self::Entity(selector)
    }
}

impl From<NodeSelector> for Selector {
    fn from(selector: NodeSelector) -> Self {
        Self::Node(selector)
    }
}

impl From<RelationshipSelector> for Selector {
    fn from(selector: RelationshipSelector) -> Self {
        Self::Relationship(selector)
    }
}
