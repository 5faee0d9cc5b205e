use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Column, Task};

pub type BoardId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Everything the backend hands over on initial load: the board, its
/// columns in sequence order, and every task with its column and position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardLoad {
    pub board: Board,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl BoardLoad {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            columns: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Append a column at the end of the sequence.
    pub fn push_column(&mut self, name: String) -> &Column {
        let position = self.columns.len() as u32;
        self.columns.push(Column::new(self.board.id, name, position));
        self.board.touch();
        &self.columns[self.columns.len() - 1]
    }

    /// Append a task to the end of a column.
    pub fn push_task(&mut self, column_id: Uuid, title: String) -> &Task {
        let position = crate::task::next_position_in_column(&self.tasks, column_id);
        self.tasks.push(Task::new(column_id, title, position));
        self.board.touch();
        &self.tasks[self.tasks.len() - 1]
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}
