//! Rolling store of title fingerprints.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use perceptual::{hamming_distance, simhash64, simhash_similarity, DEFAULT_SHINGLE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::jsonl::JsonlFile;
use crate::KeywordError;

/// The stand-in title a keyword would be published under.
pub fn synthesize_title(keyword: &str) -> String {
    format!("{} buyer's guide", keyword.trim())
}

pub fn title_fingerprint(title: &str) -> u64 {
    simhash64(title, DEFAULT_SHINGLE_SIZE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleFingerprintRecord {
    pub title: String,
    pub simhash: u64,
    pub category: String,
    pub angle: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of [`TitleStore::check_similarity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleCheck {
    pub is_duplicate: bool,
    /// `1 - hamming / 64` against the closest recent title, or 0.
    pub similarity: f64,
    pub most_similar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleStoreStats {
    pub total_records: usize,
    pub last_7_days: usize,
    pub last_30_days: usize,
}

#[derive(Debug, Default)]
pub struct TitleStore {
    records: Vec<TitleFingerprintRecord>,
    file: Option<JsonlFile>,
}

impl TitleStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, KeywordError> {
        let file = JsonlFile::new(path);
        let records = file.load()?;
        debug!(path = %file.path().display(), records = records.len(), "title_store_opened");
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

    pub fn record(
        &mut self,
        title: &str,
        category: &str,
        angle: &str,
        source: &str,
    ) -> Result<TitleFingerprintRecord, KeywordError> {
        self.record_at(title, category, angle, source, Utc::now())
    }

    pub fn record_at(
        &mut self,
        title: &str,
        category: &str,
        angle: &str,
        source: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<TitleFingerprintRecord, KeywordError> {
        let record = TitleFingerprintRecord {
            title: title.to_string(),
            simhash: title_fingerprint(title),
            category: category.to_string(),
            angle: angle.to_string(),
            source: source.to_string(),
            timestamp,
        };
        if let Some(file) = &self.file {
            file.append(&record)?;
        }
        self.records.push(record.clone());
        Ok(record)
    }

    /// Recent titles within `max_distance` bits of `title`, closest first.
    pub fn find_similar(
        &self,
        title: &str,
        max_distance: u8,
        window_days: u32,
    ) -> Vec<(&TitleFingerprintRecord, u8)> {
        self.find_similar_at(title, max_distance, window_days, Utc::now())
    }

    pub fn find_similar_at(
        &self,
        title: &str,
        max_distance: u8,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Vec<(&TitleFingerprintRecord, u8)> {
        let target = title_fingerprint(title);
        let since = now - Duration::days(i64::from(window_days));
        let mut hits: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.timestamp >= since)
            .map(|r| (r, hamming_distance(target, r.simhash)))
            .filter(|(_, distance)| *distance <= max_distance)
            .collect();
        hits.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.timestamp.cmp(&a.0.timestamp)));
        hits
    }

    pub fn check_similarity(&self, title: &str, window_days: u32, threshold: f64) -> TitleCheck {
        self.check_similarity_at(title, window_days, threshold, Utc::now())
    }

    pub fn check_similarity_at(
        &self,
        title: &str,
        window_days: u32,
        threshold: f64,
        now: DateTime<Utc>,
    ) -> TitleCheck {
        let best = self
            .find_similar_at(title, 64, window_days, now)
            .into_iter()
            .next();
        let Some((record, _)) = best else {
            return TitleCheck {
                is_duplicate: false,
                similarity: 0.0,
                most_similar: None,
            };
        };
        let similarity = simhash_similarity(title_fingerprint(title), record.simhash);
        let is_duplicate = similarity >= threshold;
        debug!(title, similarity, is_duplicate, "title_similarity_checked");
        TitleCheck {
            is_duplicate,
            similarity,
            most_similar: Some(record.title.clone()),
        }
    }

    pub fn cleanup(&mut self, days_to_keep: u32) -> Result<usize, KeywordError> {
        self.cleanup_at(days_to_keep, Utc::now())
    }

    pub fn cleanup_at(&mut self, days_to_keep: u32, now: DateTime<Utc>) -> Result<usize, KeywordError> {
        let since = now - Duration::days(i64::from(days_to_keep));
        let before = self.records.len();
        self.records.retain(|r| r.timestamp >= since);
        let removed = before - self.records.len();
        if removed > 0 {
            if let Some(file) = &self.file {
                file.rewrite(&self.records)?;
            }
            info!(removed, "title_records_pruned");
        }
        Ok(removed)
    }

    pub fn statistics(&self) -> TitleStoreStats {
        self.statistics_at(Utc::now())
    }

    pub fn statistics_at(&self, now: DateTime<Utc>) -> TitleStoreStats {
        let within = |days: i64| {
            let since = now - Duration::days(days);
            self.records.iter().filter(|r| r.timestamp >= since).count()
        };
        TitleStoreStats {
            total_records: self.records.len(),
            last_7_days: within(7),
            last_30_days: within(30),
        }
    }
}
