//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use veritas_core::ProviderId;

#[derive(Parser)]
#[command(name = "veritas")]
#[command(
    author,
    version,
    about = "Classify text as true, fake news, satire, opinion or biased with LLM providers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify content now and print the verdict
    Classify(ClassifyArgs),

    /// Queue content for the background worker
    Submit(SubmitArgs),

    /// Process queued analyses
    Worker(WorkerArgs),

    /// List recent analyses
    History(HistoryArgs),

    /// Show one analysis
    Get(GetArgs),

    /// Delete one analysis
    Delete(DeleteArgs),

    /// Show analysis counts
    Status,

    /// List configured providers in fallback order
    Providers,
}

/// Content given inline, from a file, or from stdin with `-`
#[derive(Args)]
pub struct ContentArgs {
    /// Text to classify (`-` reads stdin)
    pub content: Option<String>,

    /// Read the text from a file
    #[arg(short, long, conflicts_with = "content")]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub input: ContentArgs,

    /// Preferred provider (defaults to the configured one)
    #[arg(short, long)]
    pub provider: Option<ProviderId>,

    /// Also store the analysis in the database
    #[arg(long)]
    pub save: bool,

    /// Show every provider attempt
    #[arg(long)]
    pub attempts: bool,

    /// Accept a bare category keyword when a reply has no JSON
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Args)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub input: ContentArgs,
}

#[derive(Args)]
pub struct WorkerArgs {
    /// Maximum analyses to process in this run
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,

    /// Preferred provider (defaults to the configured one)
    #[arg(short, long)]
    pub provider: Option<ProviderId>,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Number of analyses to show
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct GetArgs {
    /// Analysis id
    pub id: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Analysis id
    pub id: String,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Cli,
    Json,
}
