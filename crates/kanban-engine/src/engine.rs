use crate::config::EngineConfig;
use crate::gateway::{CommitOutcome, QueuedMove, ReconciliationGateway};
use kanban_core::{KanbanError, KanbanResult, LogEntry, Loggable, NoticeLog};
use kanban_domain::{
    BoardId, BoardLoad, BoardSnapshot, Column, ColumnId, CommitId, DragMachine, DragPhase,
    EndOutcome, GestureRejection, RebaseOutcome, SessionId, TaskId, UpdateOutcome,
};
use kanban_persistence::BoardStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// What the rendering layer is told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    /// The visible board changed; redraw from this snapshot.
    Snapshot(BoardSnapshot),
    /// A reorder was rejected or timed out and has been rolled back.
    CommitFailed { commit_id: CommitId, message: String },
}

/// Owns a board's ordering between the input layer and the backend.
///
/// The committed snapshot only changes when a drop commits, when a queued
/// move is replayed, or when a failed commit rolls back. Everything else the
/// renderer sees during a drag is the drag machine's provisional view.
///
/// # Example
/// ```ignore
/// let (mut engine, mut renders) = BoardEngine::load(store, EngineConfig::default()).await?;
/// let session = engine.start(task_id)?;
/// engine.update(session, other_task_id);
/// engine.end(session, Some(other_task_id));
/// engine.settle().await;
/// ```
pub struct BoardEngine {
    board_id: BoardId,
    columns: Vec<Column>,
    committed: BoardSnapshot,
    drag: DragMachine,
    gateway: ReconciliationGateway,
    notices: NoticeLog,
    render_tx: mpsc::UnboundedSender<RenderEvent>,
}

impl BoardEngine {
    /// Build an engine from an initial load.
    ///
    /// Returns the engine and the receiver the rendering layer listens on.
    pub fn new(
        load: BoardLoad,
        store: Arc<dyn BoardStore>,
        config: EngineConfig,
    ) -> KanbanResult<(Self, mpsc::UnboundedReceiver<RenderEvent>)> {
        let committed = BoardSnapshot::from_load(&load.columns, &load.tasks)?;
        let gateway = ReconciliationGateway::new(store, load.board.id, config.commit_timeout);
        let (render_tx, render_rx) = mpsc::unbounded_channel();

        tracing::info!(
            "Engine ready for board '{}': {} columns, {} tasks",
            load.board.name,
            committed.lanes().len(),
            committed.len()
        );

        let engine = Self {
            board_id: load.board.id,
            columns: load.columns,
            committed,
            drag: DragMachine::new(),
            gateway,
            notices: NoticeLog::new(),
            render_tx,
        };
        Ok((engine, render_rx))
    }

    /// Fetch the initial load from `store` and build an engine over it.
    pub async fn load(
        store: Arc<dyn BoardStore>,
        config: EngineConfig,
    ) -> KanbanResult<(Self, mpsc::UnboundedReceiver<RenderEvent>)> {
        let load = store.load().await?;
        Self::new(load, store, config)
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The committed snapshot. Optimistic while a commit is in flight.
    pub fn snapshot(&self) -> &BoardSnapshot {
        &self.committed
    }

    /// What should be on screen right now.
    pub fn view(&self) -> BoardSnapshot {
        match self.drag.provisional() {
            Some(provisional) => provisional.clone(),
            None => self.resting_view(),
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn pending_commit(&self) -> Option<CommitId> {
        self.gateway.in_flight()
    }

    pub fn queued_len(&self) -> usize {
        self.gateway.queued_len()
    }

    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    pub fn start(&mut self, task_id: TaskId) -> Result<SessionId, GestureRejection> {
        let base = self.resting_view();
        match self.drag.start(&base, task_id) {
            Ok(session_id) => {
                tracing::debug!("{} started on task {}", session_id, task_id);
                Ok(session_id)
            }
            Err(rejection) => {
                tracing::debug!("Drag start refused: {}", rejection);
                Err(rejection)
            }
        }
    }

    pub fn update(&mut self, session_id: SessionId, over_id: Uuid) -> UpdateOutcome {
        let outcome = self.drag.update(session_id, &self.columns, over_id);
        match outcome {
            UpdateOutcome::Moved => {
                if let Some(provisional) = self.drag.provisional() {
                    self.emit(RenderEvent::Snapshot(provisional.clone()));
                }
            }
            UpdateOutcome::Stale => {
                tracing::warn!("Ignoring update for stale {}", session_id);
            }
            UpdateOutcome::InvalidTarget => {
                tracing::debug!("{} hovering nothing droppable ({})", session_id, over_id);
            }
            UpdateOutcome::Unchanged => {}
        }
        outcome
    }

    /// Finish the gesture. A valid drop is committed optimistically and sent
    /// to the backend, or queued if another commit is still outstanding.
    ///
    /// Sending needs a tokio runtime. Without one the drop is rolled back
    /// and a notice is recorded.
    pub fn end(&mut self, session_id: SessionId, over_id: Option<Uuid>) -> EndOutcome {
        let base = self.resting_view();
        let outcome = self.drag.end(session_id, &base, &self.columns, over_id);

        match &outcome {
            EndOutcome::Commit(final_move) => {
                if self.gateway.is_busy() {
                    self.gateway.queue(QueuedMove::from(final_move));
                    self.emit(RenderEvent::Snapshot(self.resting_view()));
                } else {
                    self.commit(final_move.snapshot.clone(), &final_move.affected);
                }
            }
            EndOutcome::Cancelled(reason) => {
                tracing::debug!("{} cancelled at drop: {:?}", session_id, reason);
                self.emit(RenderEvent::Snapshot(self.resting_view()));
            }
            EndOutcome::Stale => {
                tracing::warn!("Ignoring end for stale {}", session_id);
            }
        }
        outcome
    }

    /// Abandon the open gesture. `None` cancels whichever session is open.
    pub fn cancel(&mut self, session_id: Option<SessionId>) -> bool {
        let cancelled = self.drag.cancel(session_id);
        if cancelled {
            tracing::debug!("Drag cancelled");
            self.emit(RenderEvent::Snapshot(self.resting_view()));
        }
        cancelled
    }

    /// Wait for the in-flight commit and reconcile with its result.
    ///
    /// On success the next queued move, if still meaningful, is committed on
    /// top of the confirmed state. On failure the board goes back to the
    /// snapshot taken just before the commit and the queue is dropped. A
    /// drag still open at that point is carried over to the rolled-back
    /// board.
    pub async fn settle(&mut self) -> CommitOutcome {
        let outcome = self.gateway.settle().await;
        match &outcome {
            CommitOutcome::Idle => {}
            CommitOutcome::Confirmed { commit_id, .. } => {
                tracing::info!("{} confirmed", commit_id);
                self.commit_next_queued();
            }
            CommitOutcome::Failed {
                commit_id,
                pre_commit,
                error,
            } => {
                self.committed = pre_commit.clone();
                let discarded = self.gateway.discard_queue();
                tracing::warn!(
                    "{} failed, rolled back and discarded {} queued move(s): {}",
                    commit_id,
                    discarded,
                    error
                );
                self.report_failure(*commit_id, error);
                let resting = self.resting_view();
                match self.drag.rebase(&resting, &self.columns) {
                    RebaseOutcome::Cancelled(reason) => {
                        tracing::debug!("Open drag cancelled by rollback: {:?}", reason);
                    }
                    RebaseOutcome::Rebased => {
                        tracing::debug!("Open drag moved onto rolled-back board");
                    }
                    RebaseOutcome::Idle => {}
                }
                self.emit(RenderEvent::Snapshot(self.view()));
            }
        }
        outcome
    }

    /// Settle until nothing is in flight.
    pub async fn settle_all(&mut self) -> Vec<CommitOutcome> {
        let mut outcomes = Vec::new();
        while self.gateway.is_busy() {
            outcomes.push(self.settle().await);
        }
        outcomes
    }

    fn commit(&mut self, snapshot: BoardSnapshot, affected: &[ColumnId]) {
        let batch = match self.gateway.commit(&snapshot, affected) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::error!("Could not build reorder command: {}", e);
                self.add_log(LogEntry::error(format!("Move not saved: {}", e)));
                self.emit(RenderEvent::Snapshot(self.view()));
                return;
            }
        };

        let pre_commit = std::mem::replace(&mut self.committed, snapshot);
        match self.gateway.dispatch(batch, pre_commit.clone()) {
            Ok(commit_id) => {
                tracing::info!("{} dispatched", commit_id);
                self.emit(RenderEvent::Snapshot(self.view()));
            }
            Err(e) => {
                tracing::error!("Could not dispatch reorder: {}", e);
                self.committed = pre_commit;
                self.add_log(LogEntry::error(format!("Move not saved: {}", e)));
                self.emit(RenderEvent::Snapshot(self.view()));
            }
        }
    }

    fn commit_next_queued(&mut self) {
        while let Some(queued) = self.gateway.next_queued() {
            match queued.replay(&self.committed) {
                Some((snapshot, affected)) => {
                    tracing::debug!("Replaying queued {}", queued.session_id);
                    self.commit(snapshot, &affected);
                    return;
                }
                None => {
                    tracing::warn!(
                        "Dropping queued {}: task or column no longer applies",
                        queued.session_id
                    );
                }
            }
        }
    }

    /// The committed snapshot with queued moves laid over it.
    fn resting_view(&self) -> BoardSnapshot {
        self.gateway
            .queued()
            .fold(self.committed.clone(), |view, queued| {
                match queued.replay(&view) {
                    Some((moved, _)) => moved,
                    None => view,
                }
            })
    }

    fn report_failure(&mut self, commit_id: CommitId, error: &KanbanError) {
        let message = if error.is_persistence_failure() {
            format!("Move could not be saved: {}", error)
        } else {
            format!("Move failed: {}", error)
        };
        self.add_log(LogEntry::error(message.clone()));
        self.emit(RenderEvent::CommitFailed { commit_id, message });
    }

    fn emit(&self, event: RenderEvent) {
        if self.render_tx.send(event).is_err() {
            tracing::debug!("Render channel closed, dropping event");
        }
    }
}

impl Loggable for BoardEngine {
    fn add_log(&mut self, entry: LogEntry) {
        self.notices.add_log(entry);
    }

    fn get_logs(&self) -> Vec<&LogEntry> {
        self.notices.get_logs()
    }
}
