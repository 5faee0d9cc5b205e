use crate::context::CliContext;
use crate::output;
use kanban_domain::{BoardSnapshot, Column, ColumnId, Task, TaskId};
use kanban_persistence::BoardStore;
use serde::Serialize;
use std::collections::HashMap;

const DEFAULT_COLUMNS: [&str; 3] = ["Todo", "In Progress", "Done"];

#[derive(Serialize)]
pub struct ColumnView {
    pub id: ColumnId,
    pub name: String,
    pub tasks: Vec<TaskView>,
}

#[derive(Serialize)]
pub struct TaskView {
    pub id: TaskId,
    pub title: String,
    pub position: u32,
}

#[derive(Serialize)]
pub struct BoardView {
    pub id: uuid::Uuid,
    pub name: String,
    pub columns: Vec<ColumnView>,
}

pub async fn handle_init(ctx: &CliContext, name: String, columns: Vec<String>) -> anyhow::Result<()> {
    let columns = if columns.is_empty() {
        DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
    } else {
        columns
    };
    let load = ctx.store.create(&name, &columns).await?;
    let snapshot = BoardSnapshot::from_load(&load.columns, &load.tasks)?;
    output::output_success(board_view(&load.board, &load.columns, &load.tasks, &snapshot));
    Ok(())
}

pub async fn handle_show(ctx: &CliContext) -> anyhow::Result<()> {
    let load = ctx.store.load().await?;
    let snapshot = BoardSnapshot::from_load(&load.columns, &load.tasks)?;
    output::output_success(board_view(&load.board, &load.columns, &load.tasks, &snapshot));
    Ok(())
}

/// Lay out columns and tasks in snapshot order.
pub fn board_view(
    board: &kanban_domain::Board,
    columns: &[Column],
    tasks: &[Task],
    snapshot: &BoardSnapshot,
) -> BoardView {
    let names: HashMap<ColumnId, &str> = columns.iter().map(|c| (c.id, c.name.as_str())).collect();
    let titles: HashMap<TaskId, &str> = tasks.iter().map(|t| (t.id, t.title.as_str())).collect();

    let columns = snapshot
        .lanes()
        .iter()
        .map(|lane| ColumnView {
            id: lane.column_id,
            name: names.get(&lane.column_id).copied().unwrap_or_default().to_string(),
            tasks: snapshot
                .positions(lane.column_id)
                .into_iter()
                .map(|(id, position)| TaskView {
                    id,
                    title: titles.get(&id).copied().unwrap_or_default().to_string(),
                    position,
                })
                .collect(),
        })
        .collect();

    BoardView {
        id: board.id,
        name: board.name.clone(),
        columns,
    }
}
