//! Backend-side application of a reorder batch.
//!
//! Validation runs over the whole batch before any task record is touched,
//! which is what gives stores their all-or-nothing behaviour.

use kanban_core::{KanbanError, KanbanResult};
use kanban_domain::{BoardLoad, ColumnId, ReorderBatch, TaskId};
use std::collections::{HashMap, HashSet};

/// Check `batch` against `load` and, if it is consistent, rewrite task
/// columns and positions. Returns the number of tasks whose placement changed.
pub fn apply_reorder(load: &mut BoardLoad, batch: &ReorderBatch) -> KanbanResult<usize> {
    if batch.board_id != load.board.id {
        return Err(KanbanError::Rejected(format!(
            "Batch targets board {} but store holds {}",
            batch.board_id, load.board.id
        )));
    }

    let known_columns: HashSet<ColumnId> = load.columns.iter().map(|c| c.id).collect();
    let current: HashMap<TaskId, ColumnId> =
        load.tasks.iter().map(|t| (t.id, t.column_id)).collect();

    let mut batch_columns = HashSet::new();
    let mut listed = HashSet::new();
    for command in &batch.commands {
        if !known_columns.contains(&command.column_id) {
            return Err(KanbanError::Rejected(format!(
                "Unknown column {}",
                command.column_id
            )));
        }
        if !batch_columns.insert(command.column_id) {
            return Err(KanbanError::Rejected(format!(
                "Column {} appears twice in {}",
                command.column_id, batch.commit_id
            )));
        }
        for task_id in &command.ordered_task_ids {
            if !current.contains_key(task_id) {
                return Err(KanbanError::Rejected(format!("Unknown task {}", task_id)));
            }
            if !listed.insert(*task_id) {
                return Err(KanbanError::Rejected(format!(
                    "Task {} listed more than once",
                    task_id
                )));
            }
        }
    }

    for (task_id, column_id) in &current {
        let in_batch_column = batch_columns.contains(column_id);
        let is_listed = listed.contains(task_id);
        if in_batch_column && !is_listed {
            return Err(KanbanError::Rejected(format!(
                "Column {} order omits task {}",
                column_id, task_id
            )));
        }
        if is_listed && !in_batch_column {
            return Err(KanbanError::Rejected(format!(
                "Task {} would leave column {} without reordering it",
                task_id, column_id
            )));
        }
    }

    let placement: HashMap<TaskId, (ColumnId, u32)> = batch
        .commands
        .iter()
        .flat_map(|command| {
            command
                .ordered_task_ids
                .iter()
                .enumerate()
                .map(move |(i, id)| (*id, (command.column_id, i as u32)))
        })
        .collect();

    let mut changed = 0;
    for task in load.tasks.iter_mut() {
        if let Some((column_id, position)) = placement.get(&task.id) {
            if task.move_to_column(*column_id, *position) {
                changed += 1;
            }
        }
    }
    if changed > 0 {
        load.board.touch();
    }
    Ok(changed)
}
