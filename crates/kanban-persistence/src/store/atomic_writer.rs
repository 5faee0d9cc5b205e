use kanban_core::KanbanResult;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tokio::fs;

/// JSON file I/O that never leaves a half-written board behind.
///
/// Writes go to a temp file in the target's directory and are then renamed
/// over the target, so readers see either the old or the new document.
pub struct AtomicWriter;

impl AtomicWriter {
    pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> KanbanResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        Self::write_atomic(path, &bytes).await
    }

    pub async fn write_atomic(path: &Path, data: &[u8]) -> KanbanResult<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let temp_file = tempfile::NamedTempFile::new_in(parent)?;
        fs::write(temp_file.path(), data).await?;
        temp_file.persist(path).map_err(|e| e.error)?;

        tracing::debug!(
            "Atomically wrote {} bytes to {}",
            data.len(),
            path.display()
        );
        Ok(())
    }

    pub async fn read_json<T: DeserializeOwned>(path: &Path) -> KanbanResult<T> {
        let data = fs::read(path).await?;
        tracing::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(serde_json::from_slice(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        order: Vec<u32>,
    }

    #[tokio::test]
    async fn test_json_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("doc.json");
        let doc = Doc {
            name: "lanes".to_string(),
            order: vec![2, 0, 1],
        };

        AtomicWriter::write_json(&file_path, &doc).await.unwrap();

        let read: Doc = AtomicWriter::read_json(&file_path).await.unwrap();
        assert_eq!(read, doc);
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("doc.json");

        AtomicWriter::write_atomic(&file_path, b"first").await.unwrap();
        AtomicWriter::write_atomic(&file_path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&file_path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_read_invalid_json_is_serialization_error() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("doc.json");
        std::fs::write(&file_path, b"{ not json").unwrap();

        let err = AtomicWriter::read_json::<Doc>(&file_path).await.unwrap_err();
        assert!(matches!(err, kanban_core::KanbanError::Serialization(_)));
    }
}
