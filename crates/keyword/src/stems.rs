//! Rolling store of keyword stems.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::jsonl::JsonlFile;
use crate::{porter_stem, KeywordError};

/// Unique Porter stems of `keyword`, in first-seen order.
///
/// The keyword is lowercased and split on anything that is not alphanumeric;
/// only purely alphabetic tokens longer than two characters are stemmed.
///
/// ```rust
/// use keyword::extract_stems;
///
/// assert_eq!(extract_stems("Smart plugs, smart PLUG & 2 TVs"), vec!["smart", "plug", "tv"]);
/// assert!(extract_stems("a 42 !!").is_empty());
/// ```
pub fn extract_stems(keyword: &str) -> Vec<String> {
    let lowered = keyword.to_lowercase();
    let mut seen = HashSet::new();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 2 && token.chars().all(char::is_alphabetic))
        .map(porter_stem)
        .filter(|stem| seen.insert(stem.clone()))
        .collect()
}

/// One processed keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordStemRecord {
    pub keyword: String,
    pub stems: Vec<String>,
    pub angle: String,
    pub category: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of [`StemStore::check_overlap`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapCheck {
    pub is_duplicate: bool,
    /// `|stems ∩ recent| / |stems|`.
    pub ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemStoreStats {
    pub total_records: usize,
    pub last_7_days: usize,
    pub last_30_days: usize,
    pub unique_categories: usize,
    pub unique_angles: usize,
}

/// Stems of every keyword processed recently, optionally backed by a JSONL
/// file.
#[derive(Debug, Default)]
pub struct StemStore {
    records: Vec<KeywordStemRecord>,
    file: Option<JsonlFile>,
}

fn cutoff(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

impl StemStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the history at `path`; a missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, KeywordError> {
        let file = JsonlFile::new(path);
        let records = file.load()?;
        debug!(path = %file.path().display(), records = records.len(), "stem_store_opened");
        Ok(Self {
            records,
            file: Some(file),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[KeywordStemRecord] {
        &self.records
    }

    pub fn record(
        &mut self,
        keyword: &str,
        angle: &str,
        category: &str,
        source: &str,
    ) -> Result<KeywordStemRecord, KeywordError> {
        self.record_at(keyword, angle, category, source, Utc::now())
    }

    pub fn record_at(
        &mut self,
        keyword: &str,
        angle: &str,
        category: &str,
        source: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<KeywordStemRecord, KeywordError> {
        let record = KeywordStemRecord {
            keyword: keyword.to_string(),
            stems: extract_stems(keyword),
            angle: angle.to_string(),
            category: category.to_string(),
            source: source.to_string(),
            timestamp,
        };
        if let Some(file) = &self.file {
            file.append(&record)?;
        }
        debug!(keyword, stems = record.stems.len(), "stem_record_added");
        self.records.push(record.clone());
        Ok(record)
    }

    /// Union of the stems recorded within `days` of `now`.
    pub fn recent_stems_at(&self, days: u32, now: DateTime<Utc>) -> BTreeSet<&str> {
        let since = cutoff(now, days);
        self.records
            .iter()
            .filter(|r| r.timestamp >= since)
            .flat_map(|r| r.stems.iter().map(String::as_str))
            .collect()
    }

    pub fn check_overlap(&self, keyword: &str, window_days: u32, threshold: f64) -> OverlapCheck {
        self.check_overlap_at(keyword, window_days, threshold, Utc::now())
    }

    pub fn check_overlap_at(
        &self,
        keyword: &str,
        window_days: u32,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> OverlapCheck {
        let stems: BTreeSet<String> = extract_stems(keyword).into_iter().collect();
        let recent = self.recent_stems_at(window_days, now);
        if stems.is_empty() || recent.is_empty() {
            return OverlapCheck {
                is_duplicate: false,
                ratio: 0.0,
            };
        }
        let shared = stems.iter().filter(|s| recent.contains(s.as_str())).count();
        let ratio = shared as f64 / stems.len() as f64;
        let is_duplicate = ratio >= threshold;
        debug!(keyword, ratio, is_duplicate, "stem_overlap_checked");
        OverlapCheck {
            is_duplicate,
            ratio,
        }
    }

    /// Records within `days`, newest first, optionally limited to a category.
    pub fn recent_keywords(&self, days: u32, category: Option<&str>) -> Vec<&KeywordStemRecord> {
        self.recent_keywords_at(days, category, Utc::now())
    }

    pub fn recent_keywords_at(
        &self,
        days: u32,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<&KeywordStemRecord> {
        let since = cutoff(now, days);
        let mut recent: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.timestamp >= since)
            .filter(|r| category.map_or(true, |wanted| wanted == r.category))
            .collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent
    }

    /// Angles used in `category` within `days`, newest first.
    pub fn recent_angles(&self, category: &str, days: u32) -> Vec<String> {
        self.recent_angles_at(category, days, Utc::now())
    }

    pub fn recent_angles_at(&self, category: &str, days: u32, now: DateTime<Utc>) -> Vec<String> {
        self.recent_keywords_at(days, Some(category), now)
            .into_iter()
            .map(|r| r.angle.clone())
            .collect()
    }

    /// Drop records older than `days_to_keep`; returns how many were removed.
    pub fn cleanup(&mut self, days_to_keep: u32) -> Result<usize, KeywordError> {
        self.cleanup_at(days_to_keep, Utc::now())
    }

    pub fn cleanup_at(&mut self, days_to_keep: u32, now: DateTime<Utc>) -> Result<usize, KeywordError> {
        let since = cutoff(now, days_to_keep);
        let before = self.records.len();
        self.records.retain(|r| r.timestamp >= since);
        let removed = before - self.records.len();
        if removed > 0 {
            if let Some(file) = &self.file {
                file.rewrite(&self.records)?;
            }
            info!(removed, "stem_records_pruned");
        }
        Ok(removed)
    }

    pub fn statistics(&self) -> StemStoreStats {
        self.statistics_at(Utc::now())
    }

    pub fn statistics_at(&self, now: DateTime<Utc>) -> StemStoreStats {
        let within = |days| {
            let since = cutoff(now, days);
            self.records.iter().filter(|r| r.timestamp >= since).count()
        };
        StemStoreStats {
            total_records: self.records.len(),
            last_7_days: within(7),
            last_30_days: within(30),
            unique_categories: self
                .records
                .iter()
                .map(|r| r.category.as_str())
                .collect::<HashSet<_>>()
                .len(),
            unique_angles: self
                .records
                .iter()
                .map(|r| r.angle.as_str())
                .collect::<HashSet<_>>()
                .len(),
        }
    }
}
