//! Worker command

use crate::app::{OutputFormat, WorkerArgs};
use anyhow::Result;
use veritas_core::{jobs, BlockingClassifier, Config, Database};

pub async fn run(args: WorkerArgs, config: &Config, db: &Database, format: OutputFormat) -> Result<()> {
    let preferred = args.provider.unwrap_or(config.classifier.default_provider);
    let classifier = BlockingClassifier::from_config(config)?;

    // The job runner blocks on each classification
    let summary = tokio::task::block_in_place(|| {
        jobs::process_pending(db, &classifier, preferred, args.limit)
    })?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Cli => {
            if summary.processed == 0 {
                println!("No pending analyses.");
            } else {
                println!(
                    "Processed {} analyses: {} completed, {} failed",
                    summary.processed, summary.completed, summary.failed
                );
            }
        }
    }
    Ok(())
}
