//! Submit command

use super::read_content;
use crate::app::{OutputFormat, SubmitArgs};
use anyhow::Result;
use veritas_core::Database;

pub async fn run(args: SubmitArgs, db: &Database, format: OutputFormat) -> Result<()> {
    let content = read_content(&args.input)?;
    let id = db.create_analysis(&content)?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "id": id,
                    "status": "pending",
                }))?
            );
        }
        OutputFormat::Cli => {
            println!("Submitted analysis {}", id);
            println!("Run `veritas worker` to process it.");
        }
    }
    Ok(())
}
