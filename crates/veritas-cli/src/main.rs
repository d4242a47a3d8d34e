//! Veritas CLI
//!
//! Content classification with multi-provider LLM fallback.

use anyhow::Result;
use clap::Parser;
use veritas_core::{Config, Database, VeritasError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<VeritasError>()
            .map(VeritasError::exit_code)
            .unwrap_or(veritas_core::error::exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    // VERITAS_DB overrides the default location
    let db = Database::open(Config::database_path())?;
    db.initialize()?;

    match cli.command {
        Commands::Classify(args) => commands::classify::run(args, &config, &db, cli.format).await,
        Commands::Submit(args) => commands::submit::run(args, &db, cli.format).await,
        Commands::Worker(args) => commands::worker::run(args, &config, &db, cli.format).await,
        Commands::History(args) => commands::history::run(args, &db, cli.format).await,
        Commands::Get(args) => commands::get::run(args, &db, cli.format).await,
        Commands::Delete(args) => commands::delete::run(args, &db, cli.format).await,
        Commands::Status => commands::status::run(&db, cli.format).await,
        Commands::Providers => commands::providers::run(&config, cli.format).await,
    }
}
