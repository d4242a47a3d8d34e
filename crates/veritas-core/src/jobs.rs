//! Background analysis jobs
//!
//! Synchronous: each job calls the blocking classifier once and persists
//! the result, whatever it is.

use crate::bridge::BlockingClassifier;
use crate::db::{AnalysisSink, Database};
use crate::error::{Result, VeritasError};
use crate::model::{ClassificationResult, ProviderId};
use serde::Serialize;

/// Counters for one `process_pending` run
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobSummary {
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Classify one stored analysis and persist the outcome
pub fn run_analysis_job(
    db: &Database,
    classifier: &BlockingClassifier,
    id: &str,
    preferred: ProviderId,
) -> Result<ClassificationResult> {
    let record = db
        .get_analysis(id)?
        .ok_or_else(|| VeritasError::NotFound(id.to_string()))?;

    classify_into(db, classifier, id, &record.content, preferred)
}

/// Classify `content` and hand the outcome for `id` to `sink`.
///
/// Provider failures arrive as an error-category result and are recorded
/// like any verdict. A request the classifier refuses outright goes to
/// [`AnalysisSink::fail`].
pub fn classify_into<S: AnalysisSink + ?Sized>(
    sink: &S,
    classifier: &BlockingClassifier,
    id: &str,
    content: &str,
    preferred: ProviderId,
) -> Result<ClassificationResult> {
    tracing::info!(id = %id, provider = %preferred, "Running analysis job");

    match classifier.classify(content, preferred) {
        Ok(result) => {
            sink.record(id, &result)?;
            Ok(result)
        }
        Err(e) => {
            let message = e.to_string();
            tracing::warn!(id = %id, error = %message, "Analysis rejected");
            sink.fail(id, &message)?;
            Ok(ClassificationResult::error(message))
        }
    }
}

/// Run up to `limit` pending analyses, oldest first
pub fn process_pending(
    db: &Database,
    classifier: &BlockingClassifier,
    preferred: ProviderId,
    limit: usize,
) -> Result<JobSummary> {
    let pending = db.pending_analyses(limit)?;
    let mut summary = JobSummary::default();

    for record in pending {
        let result = run_analysis_job(db, classifier, &record.id, preferred)?;
        summary.processed += 1;
        if result.is_error() {
            summary.failed += 1;
        } else {
            summary.completed += 1;
        }
    }

    if summary.processed > 0 {
        tracing::info!(
            processed = summary.processed,
            completed = summary.completed,
            failed = summary.failed,
            "Pending analyses processed"
        );
    }
    Ok(summary)
}
