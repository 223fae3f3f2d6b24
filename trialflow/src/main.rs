// trialflow/src/main.rs

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug trialflow run ... to see the details
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            select,
            as_of,
        } => commands::run::execute(project_dir, select, as_of).await,
        Commands::Validate {
            project_dir,
            select,
        } => commands::validate::execute(project_dir, select),
        Commands::Inspect {
            project_dir,
            entity,
            as_of,
            format,
        } => commands::inspect::execute(project_dir, entity, as_of, format),
        Commands::Kinds => commands::kinds::execute(),
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
    }
}
