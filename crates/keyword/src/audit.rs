//! Append-only JSON Lines audit trail, one entry per processed keyword.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::jsonl::JsonlFile;
use crate::{DeduplicationResult, KeywordError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub result: DeduplicationResult,
}

/// Aggregates over the audit entries of a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_processed: usize,
    pub duplicates_found: usize,
    pub angles_changed: usize,
    pub avg_similarity: f64,
    pub avg_freshness: f64,
}

#[derive(Debug, Default)]
pub struct AuditLog {
    file: Option<JsonlFile>,
    memory: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(JsonlFile::new(path)),
            memory: Vec::new(),
        }
    }

    pub fn append(&mut self, entry: AuditEntry) -> Result<(), KeywordError> {
        match &self.file {
            Some(file) => file.append(&entry),
            None => {
                self.memory.push(entry);
                Ok(())
            }
        }
    }

    /// Every entry; unparseable lines are skipped.
    pub fn entries(&self) -> Result<Vec<AuditEntry>, KeywordError> {
        match &self.file {
            Some(file) => file.load(),
            None => Ok(self.memory.clone()),
        }
    }

    pub fn summarize_at(&self, days: u32, now: DateTime<Utc>) -> Result<AuditSummary, KeywordError> {
        let since = now - Duration::days(i64::from(days));
        let recent: Vec<_> = self
            .entries()?
            .into_iter()
            .filter(|e| e.timestamp >= since)
            .collect();
        if recent.is_empty() {
            return Ok(AuditSummary::default());
        }
        let n = recent.len() as f64;
        Ok(AuditSummary {
            total_processed: recent.len(),
            duplicates_found: recent.iter().filter(|e| e.result.is_duplicate).count(),
            angles_changed: recent.iter().filter(|e| e.result.angle_changed).count(),
            avg_similarity: recent.iter().map(|e| e.result.similarity_score).sum::<f64>() / n,
            avg_freshness: recent.iter().map(|e| e.result.freshness_score).sum::<f64>() / n,
        })
    }
}
