//! Get command

use crate::app::{GetArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use veritas_core::{Database, VeritasError};

pub async fn run(args: GetArgs, db: &Database, format: OutputFormat) -> Result<()> {
    let record = db
        .get_analysis(&args.id)?
        .ok_or_else(|| VeritasError::NotFound(args.id.clone()))?;
    print!("{}", output::format_record(&record, format));
    Ok(())
}
