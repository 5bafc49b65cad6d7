//! Checkpoints as JSON files, one file per stream name.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::file::CheckpointFile;
use crate::store::{CheckpointStore, StreamName};

/// Keeps the position of stream `name` in `<dir>/checkpoint_<name>.json`.
///
/// Saving writes a temporary file next to the target and renames it over the
/// target, so a reader sees either the previous position or the new one.
pub struct FilesystemStore {
    dir: PathBuf,
}

impl FilesystemStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the position of `name`.
    pub fn path_for(&self, name: &StreamName) -> PathBuf {
        self.dir.join(format!("checkpoint_{name}.json"))
    }
}

#[async_trait]
impl CheckpointStore for FilesystemStore {
    async fn save(&self, name: &StreamName, file: &CheckpointFile) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.path_for(name);
        let tmp = self.dir.join(format!(".checkpoint_{name}.json.tmp"));
        std::fs::write(&tmp, serde_json::to_vec_pretty(file)?)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        tracing::trace!("Saved checkpoint '{name}' to {}", path.display());
        Ok(())
    }

    async fn load(&self, name: &StreamName) -> Result<Option<CheckpointFile>> {
        let path = self.path_for(name);
        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let file = serde_json::from_slice(&content)
            .with_context(|| format!("Corrupt checkpoint file {}", path.display()))?;
        Ok(Some(file))
    }
}
