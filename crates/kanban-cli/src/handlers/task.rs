use crate::context::CliContext;
use crate::output;
use kanban_domain::column::find_column;
use kanban_domain::{CancelReason, Column, ColumnId, EndOutcome, ReorderCommand, TaskId};
use kanban_engine::{BoardEngine, CommitOutcome};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
pub struct MoveResult {
    pub task_id: TaskId,
    pub moved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<u64>,
    pub column_id: ColumnId,
    pub position: usize,
    pub columns: Vec<ReorderCommand>,
}

pub async fn handle_add(ctx: &CliContext, column: String, title: String) -> anyhow::Result<()> {
    let task = ctx.store.append_task(&column, &title).await?;
    output::output_success(&task);
    Ok(())
}

/// Run one complete drag through the engine: start, hover, drop, settle.
pub async fn handle_move(ctx: &CliContext, task_id: TaskId, to: String) -> anyhow::Result<()> {
    let (mut engine, _renders) = BoardEngine::load(ctx.store.clone(), ctx.engine_config).await?;
    let over_id = resolve_target(engine.columns(), &to)?;

    let session = engine.start(task_id)?;
    engine.update(session, over_id);

    match engine.end(session, Some(over_id)) {
        EndOutcome::Commit(final_move) => match engine.settle().await {
            CommitOutcome::Confirmed { commit_id, .. } => {
                let columns = final_move
                    .affected
                    .iter()
                    .filter_map(|column_id| {
                        engine
                            .snapshot()
                            .tasks_in(*column_id)
                            .map(|ids| ReorderCommand {
                                column_id: *column_id,
                                ordered_task_ids: ids.to_vec(),
                            })
                    })
                    .collect();
                output::output_success(MoveResult {
                    task_id,
                    moved: true,
                    commit_id: Some(commit_id.0),
                    column_id: final_move.to.column_id,
                    position: final_move.to.index,
                    columns,
                });
            }
            CommitOutcome::Failed { error, .. } => {
                output::output_error(&format!("Move was not saved: {}", error))
            }
            CommitOutcome::Idle => {
                let reason = engine
                    .notices()
                    .latest()
                    .map(|n| n.message.clone())
                    .unwrap_or_else(|| "Move was not dispatched".to_string());
                output::output_error(&reason)
            }
        },
        EndOutcome::Cancelled(CancelReason::NoChange) => {
            let slot = engine
                .snapshot()
                .slot_of(task_id)
                .ok_or_else(|| anyhow::anyhow!("Task not found: {}", task_id))?;
            output::output_success(MoveResult {
                task_id,
                moved: false,
                commit_id: None,
                column_id: slot.column_id,
                position: slot.index,
                columns: Vec::new(),
            });
        }
        EndOutcome::Cancelled(reason) => {
            output::output_error(&format!("Move cancelled: {:?}", reason))
        }
        EndOutcome::Stale => output::output_error("Move session expired"),
    }
    Ok(())
}

/// A uuid is passed through as-is; anything else must name a column.
fn resolve_target(columns: &[Column], key: &str) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(key) {
        return Ok(id);
    }
    find_column(columns, key)
        .map(|c| c.id)
        .ok_or_else(|| anyhow::anyhow!("Column not found: {}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_resolves_uuid_or_column_name() {
        let board_id = Uuid::new_v4();
        let columns = vec![
            Column::new(board_id, "Todo".to_string(), 0),
            Column::new(board_id, "Done".to_string(), 1),
        ];
        let raw = Uuid::new_v4();

        assert_eq!(resolve_target(&columns, &raw.to_string()).unwrap(), raw);
        assert_eq!(resolve_target(&columns, "done").unwrap(), columns[1].id);
        assert!(resolve_target(&columns, "Backlog").is_err());
    }
}
