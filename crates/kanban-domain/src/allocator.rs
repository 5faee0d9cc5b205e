//! Position allocation.
//!
//! Pure functions over a `BoardSnapshot`. None of them mutate their input or
//! fail loudly: a lookup that misses returns `None`, and a move that cannot
//! apply returns the input ordering unchanged. Callers decide what a miss
//! means for the gesture in progress.

use crate::board_snapshot::{BoardSnapshot, Slot};
use crate::{Column, ColumnId, TaskId};
use uuid::Uuid;

/// Find the column and index a task currently occupies.
pub fn locate_task(snapshot: &BoardSnapshot, task_id: TaskId) -> Option<Slot> {
    snapshot.slot_of(task_id)
}

/// Resolve what the pointer is over to a column.
///
/// `over_id` is tried as a task id first (the task's column wins), then as a
/// column id, which is what an empty column's drop area reports.
pub fn target_column_for(
    snapshot: &BoardSnapshot,
    columns: &[Column],
    over_id: Uuid,
) -> Option<ColumnId> {
    if let Some(slot) = snapshot.slot_of(over_id) {
        return Some(slot.column_id);
    }
    if columns.iter().any(|c| c.id == over_id) && snapshot.contains_column(over_id) {
        return Some(over_id);
    }
    None
}

/// Index the moved task should land on when dropped over `over_id` in `column_id`.
///
/// Dropping on a task takes that task's index; anything else appends.
pub fn destination_index(
    snapshot: &BoardSnapshot,
    task_id: TaskId,
    column_id: ColumnId,
    over_id: Uuid,
) -> usize {
    if let Some(slot) = snapshot.slot_of(over_id) {
        if slot.column_id == column_id {
            return slot.index;
        }
    }
    let len = snapshot.tasks_in(column_id).map_or(0, |ids| ids.len());
    match snapshot.slot_of(task_id) {
        Some(slot) if slot.column_id == column_id => len.saturating_sub(1),
        _ => len,
    }
}

/// Columns a move touches, origin first.
pub fn affected_columns(from: ColumnId, to: ColumnId) -> Vec<ColumnId> {
    if from == to {
        vec![from]
    } else {
        vec![from, to]
    }
}

/// Produce a new snapshot with `task_id` moved from `from` to `to` at
/// `destination_index`.
///
/// The index is clamped to the destination's length (after the task has been
/// removed), so anything past the end appends. Both touched lanes come out
/// densely indexed. Dropping a task on its own slot returns an equal snapshot.
pub fn with_task_moved(
    snapshot: &BoardSnapshot,
    task_id: TaskId,
    from: ColumnId,
    to: ColumnId,
    destination_index: usize,
) -> BoardSnapshot {
    let mut next = snapshot.clone();

    let Some(slot) = snapshot.slot_of(task_id) else {
        tracing::debug!("Move of unknown task {} ignored", task_id);
        return next;
    };
    if slot.column_id != from || !snapshot.contains_column(to) {
        tracing::debug!(
            "Move of task {} ignored: from={} to={} actual={}",
            task_id,
            from,
            to,
            slot.column_id
        );
        return next;
    }

    if from == to {
        let last = snapshot.tasks_in(from).map_or(0, |ids| ids.len()) - 1;
        if destination_index.min(last) == slot.index {
            return next;
        }
    }

    if let Some(lane) = next.lane_mut(from) {
        lane.task_ids.remove(slot.index);
    }
    if let Some(lane) = next.lane_mut(to) {
        let index = destination_index.min(lane.task_ids.len());
        lane.task_ids.insert(index, task_id);
    }

    next.forget_task(task_id);
    next.reindex_lane(from);
    if to != from {
        next.reindex_lane(to);
    }
    next
}
