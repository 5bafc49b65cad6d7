//! Change stream checkpoints
//!
//! A checkpoint records the id of the last change handed to the caller so a
//! stream can resume after it.

use anyhow::Result;
use cdc_core::{ChangeEvent, ChangeIdentifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position of a change stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CdcCheckpoint {
    /// Id of the last delivered change
    pub change_id: ChangeIdentifier,
    /// Commit time of the transaction that produced the change
    pub timestamp: DateTime<Utc>,
}

impl CdcCheckpoint {
    pub fn from_change(change: &ChangeEvent) -> Self {
        Self {
            change_id: change.id.clone(),
            timestamp: change.metadata.tx_commit_time.with_timezone(&Utc),
        }
    }
}

impl checkpoint::Checkpoint for CdcCheckpoint {
    const DATABASE_TYPE: &'static str = "neo4j-cdc";

    fn to_cli_string(&self) -> String {
        self.change_id.to_string()
    }

    /// Only the change id survives the CLI form; the timestamp is set to now.
    fn from_cli_string(s: &str) -> Result<Self> {
        let id = s.trim();
        if id.is_empty() {
            anyhow::bail!("Empty change id");
        }
        Ok(Self {
            change_id: ChangeIdentifier::new(id),
            timestamp: Utc::now(),
        })
    }
}
