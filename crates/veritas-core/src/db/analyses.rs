//! Analysis storage and status tracking

use super::Database;
use crate::error::{Result, VeritasError};
use crate::model::{AnalysisStatus, Category, ClassificationResult};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;

const SELECT_COLUMNS: &str = "SELECT id, content, classification, status, message, sources,
        color, created_at, updated_at FROM analyses";

/// One persisted analysis
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub content: String,
    pub classification: Option<Category>,
    pub status: AnalysisStatus,
    pub message: Option<String>,
    pub sources: Vec<String>,
    pub color: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl AnalysisRecord {
    pub fn is_pending(&self) -> bool {
        self.status == AnalysisStatus::Pending
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub failed: usize,
    pub by_classification: BTreeMap<String, usize>,
}

/// Destination for finished classifications
pub trait AnalysisSink {
    fn record(&self, id: &str, result: &ClassificationResult) -> Result<()>;

    /// The request never reached a provider
    fn fail(&self, id: &str, message: &str) -> Result<()>;
}

impl AnalysisSink for Database {
    fn record(&self, id: &str, result: &ClassificationResult) -> Result<()> {
        self.complete_analysis(id, result)
    }

    fn fail(&self, id: &str, message: &str) -> Result<()> {
        self.mark_failed(id, message)
    }
}

impl Database {
    /// Store new content as a pending analysis and return its id
    pub fn create_analysis(&self, content: &str) -> Result<String> {
        if content.trim().is_empty() {
            return Err(VeritasError::InvalidRequest(
                "content must not be empty".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO analyses (id, content, status, sources, created_at, updated_at)
             VALUES (?1, ?2, ?3, '[]', ?4, ?4)",
            params![id, content, AnalysisStatus::Pending.as_str(), now],
        )?;

        tracing::debug!(id = %id, "Analysis created");
        Ok(id)
    }

    pub fn get_analysis(&self, id: &str) -> Result<Option<AnalysisRecord>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let record = self
            .conn
            .query_row(&sql, params![id], row_to_analysis)
            .optional()?;
        Ok(record)
    }

    /// Most recent analyses first
    pub fn list_analyses(&self, limit: usize) -> Result<Vec<AnalysisRecord>> {
        let sql = format!(
            "{} ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            SELECT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit as i64], row_to_analysis)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Oldest pending analyses first
    pub fn pending_analyses(&self, limit: usize) -> Result<Vec<AnalysisRecord>> {
        let sql = format!(
            "{} WHERE status = ?1 ORDER BY created_at ASC, rowid ASC LIMIT ?2",
            SELECT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                params![AnalysisStatus::Pending.as_str(), limit as i64],
                row_to_analysis,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Persist a classification; status and color follow from the result
    pub fn complete_analysis(&self, id: &str, result: &ClassificationResult) -> Result<()> {
        let sources = serde_json::to_string(&result.sources)?;
        let rows = self.conn.execute(
            "UPDATE analyses SET classification = ?2, status = ?3, message = ?4,
                sources = ?5, color = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                id,
                result.classification.as_str(),
                result.status().as_str(),
                result.message,
                sources,
                result.classification.color(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        if rows == 0 {
            return Err(VeritasError::NotFound(id.to_string()));
        }
        tracing::info!(id = %id, status = %result.status(), classification = %result.classification, "Analysis stored");
        Ok(())
    }

    /// Mark an analysis failed without a model verdict
    pub fn mark_failed(&self, id: &str, message: &str) -> Result<()> {
        self.complete_analysis(id, &ClassificationResult::error(message))
    }

    /// Remove an analysis; false when the id is unknown
    pub fn delete_analysis(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM analyses WHERE id = ?1", params![id])?;
        if rows > 0 {
            tracing::info!(id = %id, "Analysis deleted");
        }
        Ok(rows > 0)
    }

    pub fn analysis_stats(&self) -> Result<AnalysisStats> {
        let mut stats = AnalysisStats::default();

        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM analyses GROUP BY status")?;
        let by_status = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for (status, count) in by_status {
            let count = count as usize;
            stats.total += count;
            match AnalysisStatus::parse(&status) {
                AnalysisStatus::Pending => stats.pending += count,
                AnalysisStatus::Completed => stats.completed += count,
                AnalysisStatus::Failed => stats.failed += count,
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT classification, COUNT(*) FROM analyses
             WHERE classification IS NOT NULL GROUP BY classification",
        )?;
        let by_class = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        stats.by_classification = by_class
            .into_iter()
            .map(|(label, count)| (label, count as usize))
            .collect();

        Ok(stats)
    }
}

fn row_to_analysis(row: &rusqlite::Row) -> rusqlite::Result<AnalysisRecord> {
    let classification: Option<String> = row.get(2)?;
    let status: String = row.get(3)?;
    let sources: String = row.get(5)?;
    Ok(AnalysisRecord {
        id: row.get(0)?,
        content: row.get(1)?,
        classification: classification.as_deref().map(Category::from_label),
        status: AnalysisStatus::parse(&status),
        message: row.get(4)?,
        sources: serde_json::from_str(&sources).unwrap_or_default(),
        color: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
