//! JSON output formatter

use veritas_core::{AnalysisRecord, ClassificationReport};

pub fn format_report(report: &ClassificationReport, saved_id: Option<&str>) -> String {
    let attempts: Vec<serde_json::Value> = report
        .attempts
        .iter()
        .map(|a| {
            serde_json::json!({
                "provider": a.provider,
                "success": a.is_success(),
                "error": a.failure_reason(),
                "elapsed_ms": a.elapsed.as_millis() as u64,
            })
        })
        .collect();

    let result = &report.result;
    let output = serde_json::json!({
        "id": saved_id,
        "classification": result.classification,
        "message": result.message,
        "sources": result.sources,
        "color": result.classification.color(),
        "status": result.status(),
        "queries": report.queries,
        "attempts": attempts,
        "timed_out": report.timed_out,
    });

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

pub fn format_records(records: &[AnalysisRecord]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string()) + "\n"
}

pub fn format_record(record: &AnalysisRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string()) + "\n"
}
