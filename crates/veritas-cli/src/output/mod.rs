//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use veritas_core::{AnalysisRecord, ClassificationReport};

/// Format the outcome of a `classify` run
pub fn format_report(
    report: &ClassificationReport,
    saved_id: Option<&str>,
    show_attempts: bool,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Json => json::format_report(report, saved_id),
        OutputFormat::Cli => terminal::format_report(report, saved_id, show_attempts),
    }
}

pub fn format_history(records: &[AnalysisRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_records(records),
        OutputFormat::Cli => terminal::format_history(records),
    }
}

pub fn format_record(record: &AnalysisRecord, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_record(record),
        OutputFormat::Cli => terminal::format_record(record),
    }
}
