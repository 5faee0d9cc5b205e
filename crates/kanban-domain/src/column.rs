use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::BoardId;

pub type ColumnId = Uuid;

pub const DEFAULT_COLUMN_COLOR: &str = "#6b7280";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub board_id: BoardId,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    /// Sequence index among the board's columns, contiguous from 0.
    pub position: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_color() -> String {
    DEFAULT_COLUMN_COLOR.to_string()
}

impl Column {
    pub fn new(board_id: BoardId, name: String, position: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board_id,
            name,
            color: default_color(),
            position,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Columns of one board ordered by their sequence index.
pub fn sorted_columns(columns: &[Column]) -> Vec<&Column> {
    let mut cols: Vec<_> = columns.iter().collect();
    cols.sort_by_key(|c| c.position);
    cols
}

/// Resolve a column by id, or by case-insensitive name.
pub fn find_column<'a>(columns: &'a [Column], key: &str) -> Option<&'a Column> {
    if let Ok(id) = key.parse::<Uuid>() {
        if let Some(column) = columns.iter().find(|c| c.id == id) {
            return Some(column);
        }
    }
    columns.iter().find(|c| c.name.eq_ignore_ascii_case(key))
}
