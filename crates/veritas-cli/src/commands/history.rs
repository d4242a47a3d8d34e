//! History command

use crate::app::{HistoryArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use veritas_core::Database;

pub async fn run(args: HistoryArgs, db: &Database, format: OutputFormat) -> Result<()> {
    let records = db.list_analyses(args.limit)?;
    print!("{}", output::format_history(&records, format));
    Ok(())
}
