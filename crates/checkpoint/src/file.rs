//! Type-tagged checkpoint record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Checkpoint;

/// A checkpoint as it is stored, tagged with the source type that wrote it.
///
/// ```json
/// {
///     "database_type": "neo4j-cdc",
///     "checkpoint": { "change_id": "A3V1...", "timestamp": "2024-01-01T00:00:00Z" },
///     "saved_at": "2024-01-01T00:00:01Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointFile {
    pub database_type: String,
    pub checkpoint: serde_json::Value,
    pub saved_at: DateTime<Utc>,
}

impl CheckpointFile {
    pub fn new<C: Checkpoint>(checkpoint: &C) -> anyhow::Result<Self> {
        Ok(Self {
            database_type: C::DATABASE_TYPE.to_string(),
            checkpoint: serde_json::to_value(checkpoint)?,
            saved_at: Utc::now(),
        })
    }

    /// Read the checkpoint back, refusing one written by another source type.
    pub fn parse<C: Checkpoint>(&self) -> anyhow::Result<C> {
        if self.database_type != C::DATABASE_TYPE {
            anyhow::bail!(
                "Checkpoint type mismatch: expected '{}', found '{}'",
                C::DATABASE_TYPE,
                self.database_type
            );
        }
        Ok(serde_json::from_value(self.checkpoint.clone())?)
    }

    pub fn database_type(&self) -> &str {
        &self.database_type
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }
}
