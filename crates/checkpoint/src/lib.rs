//! Stream positions for neo4j-cdc.
//!
//! A long-running consumer saves where it is after each change and resumes
//! from there on restart. Each source defines its own position type by
//! implementing [`Checkpoint`]; a [`CheckpointStore`] keeps the current
//! position of every named stream.

mod file;
mod filesystem;
pub mod store;

#[cfg(test)]
mod tests;

pub use file::CheckpointFile;
pub use filesystem::FilesystemStore;
pub use store::{CheckpointStore, StreamName};

/// A source-specific stream position.
///
/// ```rust
/// use checkpoint::Checkpoint;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct OffsetCheckpoint {
///     pub offset: i64,
/// }
///
/// impl Checkpoint for OffsetCheckpoint {
///     const DATABASE_TYPE: &'static str = "offset";
///
///     fn to_cli_string(&self) -> String {
///         self.offset.to_string()
///     }
///
///     fn from_cli_string(s: &str) -> anyhow::Result<Self> {
///         Ok(Self { offset: s.parse()? })
///     }
/// }
/// ```
pub trait Checkpoint: serde::Serialize + for<'de> serde::Deserialize<'de> + Clone {
    /// Source type tag, checked again when loading.
    const DATABASE_TYPE: &'static str;

    /// Form accepted back by `from_cli_string`.
    fn to_cli_string(&self) -> String;

    fn from_cli_string(s: &str) -> anyhow::Result<Self>
    where
        Self: Sized;
}

/// Replace the position saved under `name`.
pub async fn save_checkpoint<C: Checkpoint>(
    store: &dyn CheckpointStore,
    name: &StreamName,
    checkpoint: &C,
) -> anyhow::Result<()> {
    store.save(name, &CheckpointFile::new(checkpoint)?).await
}

/// Position saved under `name`, if any.
///
/// Fails when the saved position was written by another source type.
pub async fn load_checkpoint<C: Checkpoint>(
    store: &dyn CheckpointStore,
    name: &StreamName,
) -> anyhow::Result<Option<C>> {
    store
        .load(name)
        .await?
        .map(|file| file.parse())
        .transpose()
}
