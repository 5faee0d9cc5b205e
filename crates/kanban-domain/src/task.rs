use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::column::ColumnId;

pub type TaskId = Uuid;

/// A card on the board.
///
/// Only `id`, `column_id` and `position` matter for ordering. Everything else
/// is payload carried along for the backend and the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub column_id: ColumnId,
    pub position: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(column_id: ColumnId, title: String, position: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            column_id,
            position,
            title,
            description: None,
            assignees: Vec::new(),
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the task actually changed place.
    pub fn move_to_column(&mut self, column_id: ColumnId, position: u32) -> bool {
        if self.column_id == column_id && self.position == position {
            return false;
        }
        self.column_id = column_id;
        self.position = position;
        self.updated_at = Utc::now();
        true
    }
}

/// Next append position in a column.
pub fn next_position_in_column(tasks: &[Task], column_id: ColumnId) -> u32 {
    tasks.iter().filter(|t| t.column_id == column_id).count() as u32
}
