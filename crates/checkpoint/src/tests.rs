use super::*;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TestCheckpoint {
    position: i64,
    label: String,
}

impl Checkpoint for TestCheckpoint {
    const DATABASE_TYPE: &'static str = "test";

    fn to_cli_string(&self) -> String {
        format!("{}:{}", self.position, self.label)
    }

    fn from_cli_string(s: &str) -> anyhow::Result<Self> {
        let (position, label) = s
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("Invalid checkpoint format: {s}"))?;
        Ok(Self {
            position: position.parse()?,
            label: label.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OtherCheckpoint {
    offset: u64,
}

impl Checkpoint for OtherCheckpoint {
    const DATABASE_TYPE: &'static str = "other";

    fn to_cli_string(&self) -> String {
        self.offset.to_string()
    }

    fn from_cli_string(s: &str) -> anyhow::Result<Self> {
        Ok(Self { offset: s.parse()? })
    }
}

fn checkpoint(position: i64) -> TestCheckpoint {
    TestCheckpoint {
        position,
        label: "orders".to_string(),
    }
}

fn name(name: &str) -> StreamName {
    StreamName::new(name).unwrap()
}

fn files_in(dir: &TempDir) -> Vec<String> {
    let mut files: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    files.sort();
    files
}

#[test]
fn test_cli_string_roundtrip() {
    let cp = checkpoint(42);
    assert_eq!(cp.to_cli_string(), "42:orders");
    assert_eq!(TestCheckpoint::from_cli_string("42:orders").unwrap(), cp);
    assert!(TestCheckpoint::from_cli_string("42").is_err());
}

#[test]
fn test_stream_names() {
    assert_eq!(name("orders_v2-eu").as_str(), "orders_v2-eu");
    for invalid in ["", "../orders", "a/b", "a\\b", "a.b", "..", "ünïcode", "with space"] {
        assert!(StreamName::new(invalid).is_err(), "{invalid:?} should be rejected");
    }
}

#[test]
fn test_checkpoint_file_type_mismatch() {
    let file = CheckpointFile::new(&checkpoint(1)).unwrap();
    assert_eq!(file.database_type(), "test");
    assert_eq!(file.parse::<TestCheckpoint>().unwrap(), checkpoint(1));

    let err = file.parse::<OtherCheckpoint>().unwrap_err();
    assert!(err.to_string().contains("Checkpoint type mismatch"));
}

#[tokio::test]
async fn test_missing_directory_reads_none() {
    let dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(dir.path().join("does-not-exist"));
    let loaded: Option<TestCheckpoint> = load_checkpoint(&store, &name("stream")).await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_save_and_load_checkpoint() {
    let dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(dir.path());

    save_checkpoint(&store, &name("stream"), &checkpoint(7)).await.unwrap();

    let loaded: Option<TestCheckpoint> = load_checkpoint(&store, &name("stream")).await.unwrap();
    assert_eq!(loaded, Some(checkpoint(7)));
    assert_eq!(files_in(&dir), vec!["checkpoint_stream.json"]);
    assert_eq!(store.path_for(&name("stream")), dir.path().join("checkpoint_stream.json"));
}

#[tokio::test]
async fn test_save_replaces_previous_position() {
    let dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(dir.path());

    for position in 0..200 {
        save_checkpoint(&store, &name("stream"), &checkpoint(position))
            .await
            .unwrap();
    }

    let loaded: Option<TestCheckpoint> = load_checkpoint(&store, &name("stream")).await.unwrap();
    assert_eq!(loaded, Some(checkpoint(199)));
    // no history and no leftover temporary files
    assert_eq!(files_in(&dir), vec!["checkpoint_stream.json"]);
}

#[tokio::test]
async fn test_names_are_isolated() {
    let dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(dir.path());

    save_checkpoint(&store, &name("people"), &checkpoint(1)).await.unwrap();

    let loaded: Option<TestCheckpoint> = load_checkpoint(&store, &name("companies")).await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_names_sharing_a_prefix_are_isolated() {
    let dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(dir.path());

    save_checkpoint(&store, &name("stream"), &checkpoint(1)).await.unwrap();
    save_checkpoint(&store, &name("stream_b"), &checkpoint(2)).await.unwrap();

    let stream: Option<TestCheckpoint> = load_checkpoint(&store, &name("stream")).await.unwrap();
    let stream_b: Option<TestCheckpoint> =
        load_checkpoint(&store, &name("stream_b")).await.unwrap();
    assert_eq!(stream, Some(checkpoint(1)));
    assert_eq!(stream_b, Some(checkpoint(2)));

    let nothing: Option<TestCheckpoint> = load_checkpoint(&store, &name("str")).await.unwrap();
    assert!(nothing.is_none());
}

#[tokio::test]
async fn test_load_rejects_other_source_type() {
    let dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(dir.path());

    save_checkpoint(&store, &name("stream"), &checkpoint(1)).await.unwrap();

    let file = store.load(&name("stream")).await.unwrap().unwrap();
    assert_eq!(file.database_type(), "test");

    let result = load_checkpoint::<OtherCheckpoint>(&store, &name("stream")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(dir.path());
    std::fs::write(store.path_for(&name("stream")), b"{not json").unwrap();

    let err = load_checkpoint::<TestCheckpoint>(&store, &name("stream"))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Corrupt checkpoint file"));
}
