//! Bridge between optimistic snapshots and the backend store.
//!
//! At most one reorder is in flight per board. Drops that complete while it
//! is outstanding wait in a FIFO queue and are replayed against whatever the
//! backend confirmed.

use kanban_core::{KanbanError, KanbanResult};
use kanban_domain::{
    affected_columns, locate_task, with_task_moved, BoardId, BoardSnapshot, ColumnId, CommitId,
    FinalMove, ReorderBatch, SessionId, Slot, TaskId,
};
use kanban_persistence::{BoardStore, PersistenceMetadata};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A drop that completed while another commit was outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedMove {
    pub session_id: SessionId,
    pub task_id: TaskId,
    pub to: Slot,
}

impl From<&FinalMove> for QueuedMove {
    fn from(final_move: &FinalMove) -> Self {
        Self {
            session_id: final_move.session_id,
            task_id: final_move.task_id,
            to: final_move.to,
        }
    }
}

impl QueuedMove {
    /// Re-apply this move on top of `base`.
    ///
    /// `None` when the task or destination column is gone, or when the move
    /// would not change anything.
    pub fn replay(&self, base: &BoardSnapshot) -> Option<(BoardSnapshot, Vec<ColumnId>)> {
        let from = locate_task(base, self.task_id)?;
        if !base.contains_column(self.to.column_id) {
            return None;
        }
        let moved = with_task_moved(
            base,
            self.task_id,
            from.column_id,
            self.to.column_id,
            self.to.index,
        );
        if moved == *base {
            return None;
        }
        Some((moved, affected_columns(from.column_id, self.to.column_id)))
    }
}

/// How an in-flight commit resolved.
#[derive(Debug)]
pub enum CommitOutcome {
    /// Nothing was in flight.
    Idle,
    Confirmed {
        commit_id: CommitId,
        metadata: PersistenceMetadata,
    },
    Failed {
        commit_id: CommitId,
        /// The snapshot captured immediately before the optimistic commit.
        pre_commit: BoardSnapshot,
        error: KanbanError,
    },
}

struct InFlight {
    commit_id: CommitId,
    pre_commit: BoardSnapshot,
    handle: JoinHandle<KanbanResult<PersistenceMetadata>>,
}

pub struct ReconciliationGateway {
    store: Arc<dyn BoardStore>,
    board_id: BoardId,
    timeout: Duration,
    last_commit: u64,
    in_flight: Option<InFlight>,
    queued: VecDeque<QueuedMove>,
}

impl ReconciliationGateway {
    pub fn new(store: Arc<dyn BoardStore>, board_id: BoardId, timeout: Duration) -> Self {
        Self {
            store,
            board_id,
            timeout,
            last_commit: 0,
            in_flight: None,
            queued: VecDeque::new(),
        }
    }

    pub fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Build the single reorder command for a finished gesture: one full
    /// ordered id list per affected column.
    pub fn commit(
        &mut self,
        snapshot: &BoardSnapshot,
        affected: &[ColumnId],
    ) -> KanbanResult<ReorderBatch> {
        let commit_id = CommitId(self.last_commit + 1);
        let batch = ReorderBatch::from_snapshot(self.board_id, commit_id, snapshot, affected)?;
        self.last_commit = commit_id.0;
        Ok(batch)
    }

    /// Send `batch` to the store on the tokio runtime.
    ///
    /// Refuses while another commit is outstanding, and when called outside
    /// a tokio runtime. A store that does not answer within the timeout
    /// resolves as `KanbanError::Timeout`.
    pub fn dispatch(
        &mut self,
        batch: ReorderBatch,
        pre_commit: BoardSnapshot,
    ) -> KanbanResult<CommitId> {
        if let Some(open) = &self.in_flight {
            return Err(KanbanError::Internal(format!(
                "{} is still in flight",
                open.commit_id
            )));
        }

        let commit_id = batch.commit_id;
        let runtime = Handle::try_current().map_err(|e| {
            KanbanError::Internal(format!("no tokio runtime to dispatch {}: {}", commit_id, e))
        })?;
        let store = Arc::clone(&self.store);
        let timeout = self.timeout;
        tracing::debug!(
            "Dispatching {} covering {} column(s)",
            commit_id,
            batch.commands.len()
        );
        let handle = runtime.spawn(async move {
            match tokio::time::timeout(timeout, store.reorder(batch)).await {
                Ok(result) => result,
                Err(_) => Err(KanbanError::Timeout(timeout)),
            }
        });

        self.in_flight = Some(InFlight {
            commit_id,
            pre_commit,
            handle,
        });
        Ok(commit_id)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<CommitId> {
        self.in_flight.as_ref().map(|f| f.commit_id)
    }

    pub fn queue(&mut self, queued: QueuedMove) {
        tracing::debug!(
            "Queued {} behind {:?}",
            queued.session_id,
            self.in_flight()
        );
        self.queued.push_back(queued);
    }

    pub fn queued(&self) -> impl Iterator<Item = &QueuedMove> + '_ {
        self.queued.iter()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    pub fn next_queued(&mut self) -> Option<QueuedMove> {
        self.queued.pop_front()
    }

    /// Drop every queued move. Returns how many were discarded.
    pub fn discard_queue(&mut self) -> usize {
        let count = self.queued.len();
        self.queued.clear();
        count
    }

    /// Wait for the outstanding commit, if any, to resolve.
    pub async fn settle(&mut self) -> CommitOutcome {
        let Some(in_flight) = self.in_flight.take() else {
            return CommitOutcome::Idle;
        };

        let result = match in_flight.handle.await {
            Ok(result) => result,
            Err(e) => Err(KanbanError::Internal(format!("Reorder task failed: {}", e))),
        };

        match result {
            Ok(metadata) => CommitOutcome::Confirmed {
                commit_id: in_flight.commit_id,
                metadata,
            },
            Err(error) => CommitOutcome::Failed {
                commit_id: in_flight.commit_id,
                pre_commit: in_flight.pre_commit,
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_domain::Lane;
    use uuid::Uuid;

    struct NeverCalled;

    #[async_trait::async_trait]
    impl BoardStore for NeverCalled {
        async fn load(&self) -> KanbanResult<kanban_domain::BoardLoad> {
            Err(KanbanError::Internal("load".into()))
        }

        async fn reorder(&self, _batch: ReorderBatch) -> KanbanResult<PersistenceMetadata> {
            Err(KanbanError::Internal("reorder".into()))
        }
    }

    fn gateway() -> ReconciliationGateway {
        ReconciliationGateway::new(
            Arc::new(NeverCalled),
            Uuid::new_v4(),
            Duration::from_secs(1),
        )
    }

    fn two_lanes() -> (BoardSnapshot, ColumnId, ColumnId, TaskId) {
        let (x, y, t) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let snapshot =
            BoardSnapshot::from_lanes(vec![Lane::new(x, vec![t]), Lane::new(y, vec![])]).unwrap();
        (snapshot, x, y, t)
    }

    #[test]
    fn commit_ids_increase_per_batch() {
        let mut gateway = gateway();
        let (snapshot, x, _, _) = two_lanes();

        let first = gateway.commit(&snapshot, &[x]).unwrap();
        let second = gateway.commit(&snapshot, &[x]).unwrap();
        assert_eq!(first.commit_id, CommitId(1));
        assert_eq!(second.commit_id, CommitId(2));
        assert_eq!(first.board_id, gateway.board_id());
    }

    #[test]
    fn commit_for_unknown_column_does_not_burn_an_id() {
        let mut gateway = gateway();
        let (snapshot, x, _, _) = two_lanes();

        assert!(gateway.commit(&snapshot, &[Uuid::new_v4()]).is_err());
        assert_eq!(gateway.commit(&snapshot, &[x]).unwrap().commit_id, CommitId(1));
    }

    #[test]
    fn dispatch_outside_runtime_is_refused() {
        let mut gateway = gateway();
        let (snapshot, x, _, _) = two_lanes();
        let batch = gateway.commit(&snapshot, &[x]).unwrap();

        let result = gateway.dispatch(batch, snapshot);
        assert!(matches!(result, Err(KanbanError::Internal(msg)) if msg.contains("runtime")));
        assert!(!gateway.is_busy());
        assert!(gateway.in_flight().is_none());
    }

    #[test]
    fn replay_moves_task_onto_new_base() {
        let (snapshot, x, y, t) = two_lanes();
        let queued = QueuedMove {
            session_id: SessionId(1),
            task_id: t,
            to: Slot {
                column_id: y,
                index: 0,
            },
        };

        let (moved, affected) = queued.replay(&snapshot).unwrap();
        assert_eq!(moved.tasks_in(y).unwrap(), &[t]);
        assert_eq!(affected, vec![x, y]);
        assert!(queued.replay(&moved).is_none());
    }

    #[test]
    fn replay_drops_vanished_task() {
        let (snapshot, _, y, _) = two_lanes();
        let queued = QueuedMove {
            session_id: SessionId(1),
            task_id: Uuid::new_v4(),
            to: Slot {
                column_id: y,
                index: 0,
            },
        };
        assert!(queued.replay(&snapshot).is_none());
    }

    #[tokio::test]
    async fn settle_with_nothing_in_flight_is_idle() {
        let mut gateway = gateway();
        assert!(matches!(gateway.settle().await, CommitOutcome::Idle));
    }

    #[tokio::test]
    async fn second_dispatch_is_refused_while_busy() {
        let mut gateway = gateway();
        let (snapshot, x, _, _) = two_lanes();

        let first = gateway.commit(&snapshot, &[x]).unwrap();
        gateway.dispatch(first, snapshot.clone()).unwrap();
        let second = gateway.commit(&snapshot, &[x]).unwrap();
        assert!(matches!(
            gateway.dispatch(second, snapshot.clone()),
            Err(KanbanError::Internal(_))
        ));

        let CommitOutcome::Failed { pre_commit, .. } = gateway.settle().await else {
            panic!("store always fails");
        };
        assert_eq!(pre_commit, snapshot);
        assert!(!gateway.is_busy());
    }

    #[test]
    fn queue_is_fifo_and_discardable() {
        let mut gateway = gateway();
        let (_, x, _, t) = two_lanes();
        for n in 1..=3 {
            gateway.queue(QueuedMove {
                session_id: SessionId(n),
                task_id: t,
                to: Slot {
                    column_id: x,
                    index: 0,
                },
            });
        }

        assert_eq!(gateway.next_queued().unwrap().session_id, SessionId(1));
        assert_eq!(gateway.queued_len(), 2);
        assert_eq!(gateway.discard_queue(), 2);
        assert!(gateway.next_queued().is_none());
    }
}
