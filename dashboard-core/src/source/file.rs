use async_trait::async_trait;
use std::path::PathBuf;

use crate::{LoadError, Snapshot};

use super::SnapshotSource;

/// Reads the snapshot from a local file, e.g. a bucket synced to disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl SnapshotSource for FileSource {
    async fn fetch(&self) -> Result<Snapshot, LoadError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn reads_snapshot_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest.json");
        fs::write(&path, r#"{"cities":[{"city":"Quito","humidity":81}]}"#).unwrap();

        let snapshot = FileSource::new(path)
            .fetch()
            .await
            .expect("file should load");
        assert_eq!(snapshot.cities[0].humidity, Some(81.0));
    }

    #[tokio::test]
    async fn missing_file_is_network_class() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("missing.json"));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.is_network());
    }
}
