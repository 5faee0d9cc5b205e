//! Drag gesture state machine.
//!
//! ```text
//! Idle --start--> Dragging --update--> Dragging
//!                     |--end(valid)----> Commit  (COMMITTING) --> Idle
//!                     |--end(invalid)--> Cancelled            --> Idle
//!                     `--cancel--------> Cancelled            --> Idle
//! ```
//!
//! The machine never touches the committed snapshot. Updates build a
//! provisional snapshot from the pre-gesture base for rendering only; `end`
//! produces a clean final snapshot from whatever base the caller holds at
//! drop time and hands it back for the caller to commit.

use crate::allocator::{
    affected_columns, destination_index, locate_task, target_column_for, with_task_moved,
};
use crate::board_snapshot::{BoardSnapshot, Slot};
use crate::{Column, ColumnId, TaskId};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Generation counter for gestures. Events naming an older id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "drag#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureRejection {
    #[error("task {0} is not on the board")]
    StaleTask(TaskId),
    #[error("{0} is still open")]
    SessionOpen(SessionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The provisional view changed.
    Moved,
    /// Same column and index as the previous update.
    Unchanged,
    /// Nothing resolvable under the pointer; the last valid view stays.
    InvalidTarget,
    /// The event names a session that is not the open one.
    Stale,
}

/// Result of moving an open session onto a new base snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebaseOutcome {
    /// No session was open.
    Idle,
    /// The provisional view was rebuilt on the new base.
    Rebased,
    /// The session was closed because its task is not on the new base.
    Cancelled(CancelReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Requested,
    NoTarget,
    InvalidTarget,
    StaleTask,
    NoChange,
}

/// A validated drop, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalMove {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub from: Slot,
    pub to: Slot,
    pub snapshot: BoardSnapshot,
    pub affected: Vec<ColumnId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    Commit(FinalMove),
    Cancelled(CancelReason),
    Stale,
}

#[derive(Debug, Clone)]
pub struct DragSession {
    id: SessionId,
    task_id: TaskId,
    origin: Slot,
    current: Slot,
    /// Last resolvable pointer target.
    over_id: Option<Uuid>,
    base: BoardSnapshot,
    provisional: BoardSnapshot,
}

impl DragSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn origin(&self) -> Slot {
        self.origin
    }

    /// Column and index the task occupies in the provisional view.
    pub fn current(&self) -> Slot {
        self.current
    }

    /// The snapshot the provisional view is derived from. This is the
    /// board at gesture start unless the session was rebased.
    pub fn base(&self) -> &BoardSnapshot {
        &self.base
    }

    pub fn provisional(&self) -> &BoardSnapshot {
        &self.provisional
    }
}

#[derive(Debug, Clone, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Owns at most one open drag session.
#[derive(Debug, Default)]
pub struct DragMachine {
    state: DragState,
    last_id: u64,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Dragging(_) => DragPhase::Dragging,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn provisional(&self) -> Option<&BoardSnapshot> {
        self.session().map(DragSession::provisional)
    }

    /// Open a session for `task_id` over `base`.
    pub fn start(
        &mut self,
        base: &BoardSnapshot,
        task_id: TaskId,
    ) -> Result<SessionId, GestureRejection> {
        if let DragState::Dragging(open) = &self.state {
            return Err(GestureRejection::SessionOpen(open.id));
        }
        let origin = locate_task(base, task_id).ok_or(GestureRejection::StaleTask(task_id))?;

        self.last_id += 1;
        let id = SessionId(self.last_id);
        self.state = DragState::Dragging(DragSession {
            id,
            task_id,
            origin,
            current: origin,
            over_id: None,
            base: base.clone(),
            provisional: base.clone(),
        });
        Ok(id)
    }

    /// Recompute the provisional view for a new pointer target.
    ///
    /// Always derived from the session base, so repeated updates with the
    /// same target produce the same view.
    pub fn update(
        &mut self,
        session_id: SessionId,
        columns: &[Column],
        over_id: Uuid,
    ) -> UpdateOutcome {
        let DragState::Dragging(session) = &mut self.state else {
            return UpdateOutcome::Stale;
        };
        if session.id != session_id {
            return UpdateOutcome::Stale;
        }

        let Some((provisional, current)) = project(
            &session.base,
            columns,
            session.task_id,
            session.origin.column_id,
            over_id,
        ) else {
            return UpdateOutcome::InvalidTarget;
        };
        session.over_id = Some(over_id);
        if current == session.current {
            return UpdateOutcome::Unchanged;
        }

        session.current = current;
        session.provisional = provisional;
        UpdateOutcome::Moved
    }

    /// Carry the open session over to a new base, e.g. after a rollback.
    ///
    /// The task is looked up again and the provisional view is rebuilt for
    /// the last hovered target. If that target no longer resolves, the view
    /// falls back to the base itself. A task missing from the new base
    /// closes the session.
    pub fn rebase(&mut self, base: &BoardSnapshot, columns: &[Column]) -> RebaseOutcome {
        let DragState::Dragging(session) = &mut self.state else {
            return RebaseOutcome::Idle;
        };
        let Some(origin) = locate_task(base, session.task_id) else {
            self.state = DragState::Idle;
            return RebaseOutcome::Cancelled(CancelReason::StaleTask);
        };

        let projected = session.over_id.and_then(|over_id| {
            project(base, columns, session.task_id, origin.column_id, over_id)
        });
        let (provisional, current) = projected.unwrap_or_else(|| (base.clone(), origin));

        session.origin = origin;
        session.current = current;
        session.base = base.clone();
        session.provisional = provisional;
        RebaseOutcome::Rebased
    }

    /// Close the session and work out the drop.
    ///
    /// `current_base` is the snapshot the caller would commit on top of. It is
    /// normally the session's own base; if it changed mid-gesture the task
    /// and target are looked up again there, and a miss cancels.
    pub fn end(
        &mut self,
        session_id: SessionId,
        current_base: &BoardSnapshot,
        columns: &[Column],
        over_id: Option<Uuid>,
    ) -> EndOutcome {
        match &self.state {
            DragState::Dragging(session) if session.id == session_id => {}
            _ => return EndOutcome::Stale,
        }
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return EndOutcome::Stale;
        };

        let Some(over_id) = over_id else {
            return EndOutcome::Cancelled(CancelReason::NoTarget);
        };
        let Some(from) = locate_task(current_base, session.task_id) else {
            return EndOutcome::Cancelled(CancelReason::StaleTask);
        };
        let Some(column_id) = target_column_for(current_base, columns, over_id) else {
            return EndOutcome::Cancelled(CancelReason::InvalidTarget);
        };

        let index = destination_index(current_base, session.task_id, column_id, over_id);
        let snapshot = with_task_moved(
            current_base,
            session.task_id,
            from.column_id,
            column_id,
            index,
        );
        if snapshot == *current_base {
            return EndOutcome::Cancelled(CancelReason::NoChange);
        }
        let Some(to) = locate_task(&snapshot, session.task_id) else {
            return EndOutcome::Cancelled(CancelReason::StaleTask);
        };

        EndOutcome::Commit(FinalMove {
            session_id: session.id,
            task_id: session.task_id,
            from,
            to,
            affected: affected_columns(from.column_id, column_id),
            snapshot,
        })
    }

    /// Drop the open session. `None` cancels whatever is open.
    pub fn cancel(&mut self, session_id: Option<SessionId>) -> bool {
        let matches = match (&self.state, session_id) {
            (DragState::Dragging(_), None) => true,
            (DragState::Dragging(session), Some(id)) => session.id == id,
            (DragState::Idle, _) => false,
        };
        if matches {
            self.state = DragState::Idle;
        }
        matches
    }
}

/// Provisional view and resulting slot for dropping `task_id` on `over_id`.
fn project(
    base: &BoardSnapshot,
    columns: &[Column],
    task_id: TaskId,
    from: ColumnId,
    over_id: Uuid,
) -> Option<(BoardSnapshot, Slot)> {
    let column_id = target_column_for(base, columns, over_id)?;
    let index = destination_index(base, task_id, column_id, over_id);
    let provisional = with_task_moved(base, task_id, from, column_id, index);
    let current = locate_task(&provisional, task_id)?;
    Some((provisional, current))
}
