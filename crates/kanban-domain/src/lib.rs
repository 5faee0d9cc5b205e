pub mod allocator;
pub mod board;
pub mod board_snapshot;
pub mod column;
pub mod drag_session;
pub mod reorder;
pub mod task;

pub use allocator::{
    affected_columns, destination_index, locate_task, target_column_for, with_task_moved,
};
pub use board::{Board, BoardId, BoardLoad};
pub use board_snapshot::{BoardSnapshot, Lane, Slot};
pub use column::{Column, ColumnId};
pub use drag_session::{
    CancelReason, DragMachine, DragPhase, DragSession, EndOutcome, FinalMove, GestureRejection,
    RebaseOutcome, SessionId, UpdateOutcome,
};
pub use reorder::{CommitId, ReorderBatch, ReorderCommand};
pub use task::{Task, TaskId};
