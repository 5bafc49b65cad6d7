use crate::decode;
use crate::error::Result;
use crate::value::ValueMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque position in the change stream.
///
/// Identifiers are compared by their underlying string. A change identifier
/// can be used to query changes from that position onward.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeIdentifier(String);

impl ChangeIdentifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Decode the `id` column of a `db.cdc.earliest`/`db.cdc.current` row.
    pub fn from_record(record: &ValueMap) -> Result<Self> {
        decode::require_string(record, "id").map(Self)
    }
}

impl fmt::Display for ChangeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChangeIdentifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
