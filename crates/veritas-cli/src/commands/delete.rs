//! Delete command

use crate::app::{DeleteArgs, OutputFormat};
use anyhow::Result;
use veritas_core::{Database, VeritasError};

pub async fn run(args: DeleteArgs, db: &Database, format: OutputFormat) -> Result<()> {
    if !db.delete_analysis(&args.id)? {
        return Err(VeritasError::NotFound(args.id).into());
    }

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "id": args.id,
                    "deleted": true,
                }))?
            );
        }
        OutputFormat::Cli => println!("Deleted analysis {}", args.id),
    }
    Ok(())
}
