use crate::decode;
use crate::error::Result;
use crate::value::ValueMap;
use serde::Serialize;

/// Common view over node and relationship states.
///
/// Projection code uses this to rebuild a state with a filtered property map
/// without caring which kind of entity it belongs to.
pub trait EntityState: Clone {
    fn properties(&self) -> &ValueMap;

    /// Copy of this state holding `properties` instead of the current map.
    fn with_properties(&self, properties: ValueMap) -> Self;
}

/// Node state before or after a change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeState {
    pub labels: Vec<String>,
    pub properties: ValueMap,
}

impl NodeState {
    pub fn new(labels: Vec<String>, properties: ValueMap) -> Self {
        Self { labels, properties }
    }

    pub(crate) fn from_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            labels: decode::get_string_list(map, "labels")?,
            properties: decode::get_map(map, "properties")?.cloned().unwrap_or_default(),
        })
    }
}

impl EntityState for NodeState {
    fn properties(&self) -> &ValueMap {
        &self.properties
    }

    fn with_properties(&self, properties: ValueMap) -> Self {
        Self {
            labels: self.labels.clone(),
            properties,
        }
    }
}

/// Relationship state before or after a change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipState {
    pub properties: ValueMap,
}

impl RelationshipState {
    pub fn new(properties: ValueMap) -> Self {
        Self { properties }
    }

    pub(crate) fn from_map(map: &ValueMap) -> Result<Self> {
        Ok(Self {
            properties: decode::get_map(map, "properties")?.cloned().unwrap_or_default(),
        })
    }
}

impl EntityState for RelationshipState {
    fn properties(&self) -> &ValueMap {
        &self.properties
    }

    fn with_properties(&self, properties: ValueMap) -> Self {
        Self { properties }
    }
}
