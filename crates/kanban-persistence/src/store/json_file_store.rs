use crate::reorder::apply_reorder;
use crate::store::atomic_writer::AtomicWriter;
use crate::traits::{BoardStore, PersistenceMetadata, FORMAT_VERSION};
use kanban_core::{KanbanError, KanbanResult};
use kanban_domain::column::find_column;
use kanban_domain::{Board, BoardLoad, ReorderBatch, Task};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

/// JSON file-based board store.
///
/// Every mutation is read-modify-write under a lock, and the write is atomic,
/// so a rejected batch leaves the file untouched.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    instance_id: Uuid,
    write_lock: Mutex<()>,
}

/// Wrapper structure for the JSON file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: BoardLoad,
}

impl JsonEnvelope {
    pub fn new(instance_id: Uuid, data: BoardLoad) -> Self {
        Self {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(instance_id),
            data,
        }
    }
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_instance_id(path, Uuid::new_v4())
    }

    /// Create a store with a specific instance ID
    /// (useful for testing or coordinating across instances)
    pub fn with_instance_id(path: impl AsRef<Path>, instance_id: Uuid) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            instance_id,
            write_lock: Mutex::new(()),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Write a fresh board with the given columns. Refuses to overwrite.
    pub async fn create(&self, board_name: &str, column_names: &[String]) -> KanbanResult<BoardLoad> {
        let _guard = self.write_lock.lock().await;
        if self.exists().await {
            return Err(KanbanError::Validation(format!(
                "{} already exists",
                self.path.display()
            )));
        }

        let mut load = BoardLoad::new(Board::new(board_name.to_string(), None));
        for name in column_names {
            load.push_column(name.clone());
        }
        self.write(load.clone()).await?;
        tracing::info!(
            "Created board '{}' with {} columns at {}",
            board_name,
            column_names.len(),
            self.path.display()
        );
        Ok(load)
    }

    /// Append a task to the end of a column, found by id or name.
    pub async fn append_task(&self, column: &str, title: &str) -> KanbanResult<Task> {
        let _guard = self.write_lock.lock().await;
        let mut load = self.read().await?;
        let column_id = find_column(&load.columns, column)
            .map(|c| c.id)
            .ok_or_else(|| KanbanError::NotFound(format!("Column '{}'", column)))?;

        let task = load.push_task(column_id, title.to_string()).clone();
        self.write(load).await?;
        Ok(task)
    }

    async fn read(&self) -> KanbanResult<BoardLoad> {
        let envelope: JsonEnvelope = AtomicWriter::read_json(&self.path).await?;
        if envelope.version != FORMAT_VERSION {
            return Err(KanbanError::Serialization(format!(
                "Unsupported format version: {}",
                envelope.version
            )));
        }
        Ok(envelope.data)
    }

    async fn write(&self, load: BoardLoad) -> KanbanResult<PersistenceMetadata> {
        let envelope = JsonEnvelope::new(self.instance_id, load);
        AtomicWriter::write_json(&self.path, &envelope).await?;
        Ok(envelope.metadata)
    }
}

#[async_trait::async_trait]
impl BoardStore for JsonFileStore {
    async fn load(&self) -> KanbanResult<BoardLoad> {
        if !self.exists().await {
            return Err(KanbanError::NotFound(format!(
                "Board file {}",
                self.path.display()
            )));
        }
        let load = self.read().await?;
        tracing::info!(
            "Loaded board '{}' ({} columns, {} tasks) from {}",
            load.board.name,
            load.columns.len(),
            load.tasks.len(),
            self.path.display()
        );
        Ok(load)
    }

    async fn reorder(&self, batch: ReorderBatch) -> KanbanResult<PersistenceMetadata> {
        let _guard = self.write_lock.lock().await;
        let mut load = self.read().await?;

        let changed = apply_reorder(&mut load, &batch).inspect_err(|e| {
            tracing::warn!("Rejected {}: {}", batch.commit_id, e);
        })?;
        let metadata = self.write(load).await?;

        tracing::info!(
            "Persisted {} across {} column(s), {} task(s) moved",
            batch.commit_id,
            batch.commands.len(),
            changed
        );
        Ok(metadata)
    }
}
