use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kanban_core::KanbanResult;
use kanban_domain::{BoardLoad, ReorderBatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Metadata for persistence operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the instance that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(instance_id: Uuid) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// The backend collaborator the engine talks to.
///
/// `reorder` either applies the whole batch or rejects it; there is no
/// partial success. Implementations persist dense positions matching the
/// order of each command's id list.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Initial load: board, ordered columns, and every task with its position.
    async fn load(&self) -> KanbanResult<BoardLoad>;

    /// Persist one gesture's reorder batch.
    async fn reorder(&self, batch: ReorderBatch) -> KanbanResult<PersistenceMetadata>;
}
