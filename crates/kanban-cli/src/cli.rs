use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "kanban")]
#[command(about = "Order and move tasks on a kanban board", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to kanban data file (or set KANBAN_FILE env var)
    #[arg(long, global = true, value_name = "FILE", env = "KANBAN_FILE")]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new board file
    Init {
        #[arg(long)]
        name: String,
        /// Column names in display order (repeatable)
        #[arg(long = "column", value_name = "NAME")]
        columns: Vec<String>,
    },
    /// Append a task to the end of a column
    Add {
        /// Column id or name
        #[arg(long)]
        column: String,
        title: String,
    },
    /// Print every column with its tasks in order
    Show,
    /// Drag a task onto another task or a column and persist the result
    Move {
        task: Uuid,
        /// Task id, column id, or column name to drop onto
        #[arg(long)]
        to: String,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
