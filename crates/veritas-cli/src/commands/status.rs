//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use veritas_core::Database;

pub async fn run(db: &Database, format: OutputFormat) -> Result<()> {
    let stats = db.analysis_stats()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Cli => {
            println!("Analyses:        {}", stats.total);
            println!("  Pending:       {}", stats.pending);
            println!("  Completed:     {}", stats.completed);
            println!("  Failed:        {}", stats.failed);
            if !stats.by_classification.is_empty() {
                println!();
                println!("Classifications:");
                for (label, count) in &stats.by_classification {
                    println!("  {:<14} {}", format!("{}:", label), count);
                }
            }
        }
    }
    Ok(())
}
