//! Named stream positions and the storage seam.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

use crate::file::CheckpointFile;

/// Name a stream position is saved under.
///
/// Only ASCII letters, digits, `-` and `_` are allowed, so every name maps to
/// exactly one storage key and can never point outside the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamName(String);

impl StreamName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            anyhow::bail!("Checkpoint name must not be empty");
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            anyhow::bail!(
                "Invalid checkpoint name '{name}': '{c}' is not allowed, use letters, digits, '-' or '_'"
            );
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for the current position of each named stream.
///
/// A store keeps one position per name: `save` replaces whatever was saved
/// under that name before.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn save(&self, name: &StreamName, file: &CheckpointFile) -> Result<()>;

    /// Position saved under `name`, or `None` if nothing was saved yet.
    async fn load(&self, name: &StreamName) -> Result<Option<CheckpointFile>>;
}
