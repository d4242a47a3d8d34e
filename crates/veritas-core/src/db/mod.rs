//! Database layer for veritas
//!
//! SQLite storage of analyses and their processing status.

mod analyses;
mod schema;

pub use analyses::{AnalysisRecord, AnalysisSink, AnalysisStats};
pub use schema::Database;
use std::path::PathBuf;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::DATA_DIR_NAME)
            .join("analyses.sqlite")
    }
}
