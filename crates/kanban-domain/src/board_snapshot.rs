//! In-memory ordering of a board.
//!
//! A `BoardSnapshot` records which tasks sit in which column and in what
//! order. Positions are never stored: a task's position is its index in its
//! column's lane, so the dense `0..n-1` rule holds by construction. A reverse
//! index maps every task to its slot for constant-time lookup.

use crate::{column::sorted_columns, Column, ColumnId, Task, TaskId};
use kanban_core::{KanbanError, KanbanResult};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One column's tasks in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lane {
    pub column_id: ColumnId,
    pub task_ids: Vec<TaskId>,
}

impl Lane {
    pub fn new(column_id: ColumnId, task_ids: Vec<TaskId>) -> Self {
        Self {
            column_id,
            task_ids,
        }
    }

    pub fn len(&self) -> usize {
        self.task_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.task_ids.is_empty()
    }
}

/// Where a task currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub column_id: ColumnId,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    lanes: Vec<Lane>,
    slots: HashMap<TaskId, Slot>,
}

impl BoardSnapshot {
    /// Build the starting snapshot from the backend's initial load.
    ///
    /// Columns are ordered by their sequence index and tasks by their stored
    /// position. Gaps or duplicate positions are compacted rather than
    /// rejected, since the stored order is still meaningful.
    pub fn from_load(columns: &[Column], tasks: &[Task]) -> KanbanResult<Self> {
        let mut seen_columns = HashSet::new();
        let mut lanes = Vec::with_capacity(columns.len());
        for (expected, column) in sorted_columns(columns).into_iter().enumerate() {
            if !seen_columns.insert(column.id) {
                return Err(KanbanError::Validation(format!(
                    "Duplicate column id {}",
                    column.id
                )));
            }
            if column.position as usize != expected {
                tracing::warn!(
                    "Column '{}' has sequence index {} (expected {})",
                    column.name,
                    column.position,
                    expected
                );
            }
            lanes.push(Lane::new(column.id, Vec::new()));
        }

        let mut grouped: HashMap<ColumnId, Vec<&Task>> = HashMap::new();
        let mut seen_tasks = HashSet::new();
        for task in tasks {
            if !seen_columns.contains(&task.column_id) {
                return Err(KanbanError::Validation(format!(
                    "Task {} references unknown column {}",
                    task.id, task.column_id
                )));
            }
            if !seen_tasks.insert(task.id) {
                return Err(KanbanError::Validation(format!(
                    "Duplicate task id {}",
                    task.id
                )));
            }
            grouped.entry(task.column_id).or_default().push(task);
        }

        for lane in lanes.iter_mut() {
            let Some(mut members) = grouped.remove(&lane.column_id) else {
                continue;
            };
            // Stable sort keeps load order as the tie-break for equal positions.
            members.sort_by_key(|t| t.position);
            let dense = members
                .iter()
                .enumerate()
                .all(|(i, t)| t.position as usize == i);
            if !dense {
                tracing::warn!(
                    "Compacting non-dense positions in column {}",
                    lane.column_id
                );
            }
            lane.task_ids = members.iter().map(|t| t.id).collect();
        }

        Ok(Self::from_lanes_unchecked(lanes))
    }

    /// Build a snapshot from explicit lanes, rejecting duplicate ids.
    pub fn from_lanes(lanes: Vec<Lane>) -> KanbanResult<Self> {
        let mut columns = HashSet::new();
        let mut tasks = HashSet::new();
        for lane in &lanes {
            if !columns.insert(lane.column_id) {
                return Err(KanbanError::Validation(format!(
                    "Duplicate column id {}",
                    lane.column_id
                )));
            }
            for task_id in &lane.task_ids {
                if !tasks.insert(*task_id) {
                    return Err(KanbanError::Validation(format!(
                        "Task {} appears in more than one slot",
                        task_id
                    )));
                }
            }
        }
        Ok(Self::from_lanes_unchecked(lanes))
    }

    fn from_lanes_unchecked(lanes: Vec<Lane>) -> Self {
        let mut snapshot = Self {
            lanes,
            slots: HashMap::new(),
        };
        snapshot.rebuild_index();
        snapshot
    }

    fn rebuild_index(&mut self) {
        self.slots.clear();
        for lane in &self.lanes {
            for (index, task_id) in lane.task_ids.iter().enumerate() {
                self.slots.insert(
                    *task_id,
                    Slot {
                        column_id: lane.column_id,
                        index,
                    },
                );
            }
        }
    }

    /// Refresh reverse-index entries for one lane after its order changed.
    pub(crate) fn reindex_lane(&mut self, column_id: ColumnId) {
        let Some(lane) = self.lanes.iter().find(|l| l.column_id == column_id) else {
            return;
        };
        for (index, task_id) in lane.task_ids.iter().enumerate() {
            self.slots
                .insert(*task_id, Slot { column_id, index });
        }
    }

    pub(crate) fn lane_mut(&mut self, column_id: ColumnId) -> Option<&mut Lane> {
        self.lanes.iter_mut().find(|l| l.column_id == column_id)
    }

    pub(crate) fn forget_task(&mut self, task_id: TaskId) {
        self.slots.remove(&task_id);
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, column_id: ColumnId) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.column_id == column_id)
    }

    pub fn column_ids(&self) -> impl Iterator<Item = ColumnId> + '_ {
        self.lanes.iter().map(|l| l.column_id)
    }

    pub fn tasks_in(&self, column_id: ColumnId) -> Option<&[TaskId]> {
        self.lane(column_id).map(|l| l.task_ids.as_slice())
    }

    pub fn slot_of(&self, task_id: TaskId) -> Option<Slot> {
        self.slots.get(&task_id).copied()
    }

    pub fn contains_column(&self, column_id: ColumnId) -> bool {
        self.lane(column_id).is_some()
    }

    /// Total number of tasks on the board.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Dense positions for one column, in order.
    pub fn positions(&self, column_id: ColumnId) -> Vec<(TaskId, u32)> {
        self.tasks_in(column_id)
            .map(|ids| {
                ids.iter()
                    .enumerate()
                    .map(|(i, id)| (*id, i as u32))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Verify single ownership and agreement between lanes and reverse index.
    pub fn check_invariants(&self) -> KanbanResult<()> {
        let mut seen = HashSet::new();
        let mut total = 0;
        for lane in &self.lanes {
            for (index, task_id) in lane.task_ids.iter().enumerate() {
                total += 1;
                if !seen.insert(*task_id) {
                    return Err(KanbanError::Validation(format!(
                        "Task {} is owned by more than one slot",
                        task_id
                    )));
                }
                let expected = Slot {
                    column_id: lane.column_id,
                    index,
                };
                if self.slots.get(task_id) != Some(&expected) {
                    return Err(KanbanError::Validation(format!(
                        "Reverse index disagrees for task {}",
                        task_id
                    )));
                }
            }
        }
        if total != self.slots.len() {
            return Err(KanbanError::Validation(format!(
                "Reverse index holds {} entries for {} placed tasks",
                self.slots.len(),
                total
            )));
        }
        Ok(())
    }

    /// Write column membership and dense positions back onto task records.
    ///
    /// Returns the number of tasks whose placement changed. Tasks missing from
    /// the snapshot are left alone.
    pub fn apply_to_tasks(&self, tasks: &mut [Task]) -> usize {
        let mut changed = 0;
        for task in tasks.iter_mut() {
            if let Some(slot) = self.slot_of(task.id) {
                if task.move_to_column(slot.column_id, slot.index as u32) {
                    changed += 1;
                }
            }
        }
        changed
    }
}
