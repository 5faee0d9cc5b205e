mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;
use kanban_core::AppConfig;
use tracing_subscriber::EnvFilter;

fn init_tracing() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("KANBAN_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "kanban", &mut std::io::stdout());
        return Ok(());
    }

    let config = AppConfig::load();
    let ctx = CliContext::open(cli.file, &config)?;

    match cli.command {
        Commands::Init { name, columns } => handlers::board::handle_init(&ctx, name, columns).await,
        Commands::Add { column, title } => handlers::task::handle_add(&ctx, column, title).await,
        Commands::Show => handlers::board::handle_show(&ctx).await,
        Commands::Move { task, to } => handlers::task::handle_move(&ctx, task, to).await,
        Commands::Completions { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        output::output_error(&e.to_string());
    }
    Ok(())
}
