//! The reorder command sent to the backend after a drop.
//!
//! Commands carry the complete ordered id list of each touched column rather
//! than a delta, so the backend only has to persist dense positions in array
//! order.

use crate::{BoardId, BoardSnapshot, ColumnId, TaskId};
use kanban_core::{KanbanError, KanbanResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one commit so late responses can be matched or discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommitId(pub u64);

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "commit#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderCommand {
    pub column_id: ColumnId,
    pub ordered_task_ids: Vec<TaskId>,
}

/// Everything one completed gesture asks the backend to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBatch {
    pub board_id: BoardId,
    pub commit_id: CommitId,
    pub commands: Vec<ReorderCommand>,
}

impl ReorderBatch {
    /// Capture the full order of each affected column from `snapshot`.
    pub fn from_snapshot(
        board_id: BoardId,
        commit_id: CommitId,
        snapshot: &BoardSnapshot,
        affected: &[ColumnId],
    ) -> KanbanResult<Self> {
        let mut commands = Vec::with_capacity(affected.len());
        for column_id in affected {
            if commands
                .iter()
                .any(|c: &ReorderCommand| c.column_id == *column_id)
            {
                continue;
            }
            let ordered_task_ids = snapshot
                .tasks_in(*column_id)
                .ok_or_else(|| KanbanError::NotFound(format!("Column {}", column_id)))?
                .to_vec();
            commands.push(ReorderCommand {
                column_id: *column_id,
                ordered_task_ids,
            });
        }
        Ok(Self {
            board_id,
            commit_id,
            commands,
        })
    }

    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.commands.iter().map(|c| c.column_id)
    }
}
