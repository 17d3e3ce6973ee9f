//! Keyword-level deduplication: stem overlap, title similarity, angle rewrite.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::{
    catalog_statistics, force_angle_change, synthesize_title, AngleCatalogStats, AuditEntry,
    AuditLog, AuditSummary, KeywordConfig, KeywordError, StemStore, StemStoreStats, TitleStore,
    TitleStoreStats,
};

/// Angle recorded for keywords accepted as they are.
pub const GENERAL_ANGLE: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordAction {
    AcceptedOriginal,
    AngleChanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeduplicationResult {
    pub original_keyword: String,
    pub processed_keyword: String,
    pub is_duplicate: bool,
    /// Larger of the stem overlap ratio and the title similarity.
    pub similarity_score: f64,
    pub angle_changed: bool,
    /// Axis name, or `"general"`.
    pub angle: String,
    pub modifier: Option<String>,
    pub reason: String,
    pub sources: Vec<String>,
    pub freshness_score: f64,
    pub novelty_penalty: f64,
    pub action: KeywordAction,
}

/// One entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRequest {
    pub keyword: String,
    pub category: String,
    pub source: String,
}

impl KeywordRequest {
    pub fn new(
        keyword: impl Into<String>,
        category: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            category: category.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub timeframe_days: u32,
    pub stems: StemStoreStats,
    pub titles: TitleStoreStats,
    pub angles: AngleCatalogStats,
    pub recent_processing: AuditSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub stems_removed: usize,
    pub titles_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordStats {
    pub stems: StemStoreStats,
    pub titles: TitleStoreStats,
    pub angles: AngleCatalogStats,
}

/// Owns the rolling stores and the audit log for one state directory.
#[derive(Debug)]
pub struct KeywordDeduplicator {
    config: KeywordConfig,
    stems: StemStore,
    titles: TitleStore,
    audit: AuditLog,
}

impl KeywordDeduplicator {
    pub fn new(
        config: KeywordConfig,
        stems: StemStore,
        titles: TitleStore,
        audit: AuditLog,
    ) -> Result<Self, KeywordError> {
        config.validate()?;
        Ok(Self {
            config,
            stems,
            titles,
            audit,
        })
    }

    pub fn in_memory(config: KeywordConfig) -> Result<Self, KeywordError> {
        Self::new(
            config,
            StemStore::in_memory(),
            TitleStore::in_memory(),
            AuditLog::in_memory(),
        )
    }

    /// Stores live in `state_dir` as `stems.jsonl`, `titles.jsonl` and
    /// `audit.jsonl`.
    pub fn open(state_dir: &Path, config: KeywordConfig) -> Result<Self, KeywordError> {
        Self::new(
            config,
            StemStore::open(state_dir.join("stems.jsonl"))?,
            TitleStore::open(state_dir.join("titles.jsonl"))?,
            AuditLog::open(state_dir.join("audit.jsonl")),
        )
    }

    pub fn config(&self) -> &KeywordConfig {
        &self.config
    }

    pub fn stem_store(&self) -> &StemStore {
        &self.stems
    }

    pub fn title_store(&self) -> &TitleStore {
        &self.titles
    }

    pub fn process(
        &mut self,
        keyword: &str,
        category: &str,
        source: &str,
    ) -> Result<DeduplicationResult, KeywordError> {
        self.process_at(keyword, category, source, Utc::now())
    }

    /// Check `keyword` against the windows ending at `now`, re-angle it when
    /// it repeats recent work, and record whatever is kept.
    pub fn process_at(
        &mut self,
        keyword: &str,
        category: &str,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<DeduplicationResult, KeywordError> {
        let original = keyword.trim();
        if original.is_empty() {
            return Err(KeywordError::EmptyKeyword);
        }
        let _span = info_span!("keyword_process", keyword = original, category).entered();
        let cfg = &self.config;

        let stem = self.stems.check_overlap_at(
            original,
            cfg.stem_window_days,
            cfg.stem_overlap_threshold,
            now,
        );
        let title = self.titles.check_similarity_at(
            &synthesize_title(original),
            cfg.title_window_days,
            cfg.title_similarity_threshold,
            now,
        );
        let is_duplicate = stem.is_duplicate || title.is_duplicate;
        let similarity_score = stem.ratio.max(title.similarity);

        let mut result = DeduplicationResult {
            original_keyword: original.to_string(),
            processed_keyword: original.to_string(),
            is_duplicate,
            similarity_score,
            angle_changed: false,
            angle: GENERAL_ANGLE.to_string(),
            modifier: None,
            reason: format!(
                "no duplicate detected (stem overlap {:.2}, title similarity {:.2})",
                stem.ratio, title.similarity
            ),
            sources: vec![source.to_string()],
            freshness_score: (1.0 - similarity_score).max(0.0),
            novelty_penalty: 0.0,
            action: KeywordAction::AcceptedOriginal,
        };

        if is_duplicate {
            let recent = self
                .stems
                .recent_angles_at(category, cfg.angle_window_days, now);
            let change = force_angle_change(original, &recent, &cfg.preferred_axes);
            let mut triggers = Vec::new();
            if stem.is_duplicate {
                triggers.push(format!("stem overlap {:.2}", stem.ratio));
            }
            if title.is_duplicate {
                triggers.push(format!("title similarity {:.2}", title.similarity));
            }
            result.reason = format!(
                "duplicate detected ({}); applied {} angle: {}",
                triggers.join(", "),
                change.axis,
                change.modifier
            );
            result.processed_keyword = change.new_keyword;
            result.angle_changed = true;
            result.angle = change.axis.to_string();
            result.modifier = Some(change.modifier);
            result.novelty_penalty = cfg.novelty_penalty;
            result.action = KeywordAction::AngleChanged;
        }

        self.stems.record_at(
            &result.processed_keyword,
            &result.angle,
            category,
            source,
            now,
        )?;
        self.titles.record_at(
            &synthesize_title(&result.processed_keyword),
            category,
            &result.angle,
            source,
            now,
        )?;
        self.audit.append(AuditEntry {
            timestamp: now,
            result: result.clone(),
        })?;

        info!(
            processed = %result.processed_keyword,
            duplicate = result.is_duplicate,
            similarity = result.similarity_score,
            angle = %result.angle,
            "keyword_processed"
        );
        Ok(result)
    }

    /// Process each non-blank request in order.
    pub fn process_batch(
        &mut self,
        requests: &[KeywordRequest],
    ) -> Result<Vec<DeduplicationResult>, KeywordError> {
        let now = Utc::now();
        requests
            .iter()
            .filter(|r| !r.keyword.trim().is_empty())
            .map(|r| self.process_at(&r.keyword, &r.category, &r.source, now))
            .collect()
    }

    pub fn recent_activity(&self, days: u32) -> Result<ActivitySummary, KeywordError> {
        self.recent_activity_at(days, Utc::now())
    }

    pub fn recent_activity_at(
        &self,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<ActivitySummary, KeywordError> {
        Ok(ActivitySummary {
            timeframe_days: days,
            stems: self.stems.statistics_at(now),
            titles: self.titles.statistics_at(now),
            angles: catalog_statistics(),
            recent_processing: self.audit.summarize_at(days, now)?,
        })
    }

    pub fn cleanup(&mut self, days_to_keep: u32) -> Result<CleanupReport, KeywordError> {
        self.cleanup_at(days_to_keep, Utc::now())
    }

    pub fn cleanup_at(
        &mut self,
        days_to_keep: u32,
        now: DateTime<Utc>,
    ) -> Result<CleanupReport, KeywordError> {
        let report = CleanupReport {
            stems_removed: self.stems.cleanup_at(days_to_keep, now)?,
            titles_removed: self.titles.cleanup_at(days_to_keep, now)?,
        };
        info!(
            days_to_keep,
            stems = report.stems_removed,
            titles = report.titles_removed,
            "keyword_state_cleaned"
        );
        Ok(report)
    }

    pub fn statistics(&self) -> KeywordStats {
        KeywordStats {
            stems: self.stems.statistics(),
            titles: self.titles.statistics(),
            angles: catalog_statistics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn first_keyword_is_accepted() {
        let mut dedup = KeywordDeduplicator::in_memory(KeywordConfig::default()).unwrap();
        let r = dedup
            .process_at("smart plug alexa", "smart_plugs", "reddit", t0())
            .unwrap();
        assert_eq!(r.action, KeywordAction::AcceptedOriginal);
        assert!(!r.is_duplicate);
        assert_eq!(r.angle, GENERAL_ANGLE);
        assert_eq!(r.processed_keyword, "smart plug alexa");
        assert_eq!(r.similarity_score, 0.0);
        assert_eq!(r.freshness_score, 1.0);
        assert_eq!(r.novelty_penalty, 0.0);
        assert_eq!(dedup.stem_store().len(), 1);
        assert_eq!(dedup.title_store().len(), 1);
    }

    #[test]
    fn repeated_keyword_is_reangled() {
        let mut dedup = KeywordDeduplicator::in_memory(KeywordConfig::default()).unwrap();
        dedup
            .process_at("robot vacuum pet hair", "vacuums", "youtube", t0())
            .unwrap();
        let r = dedup
            .process_at(
                "robot vacuum pet hair",
                "vacuums",
                "amazon",
                t0() + Duration::hours(3),
            )
            .unwrap();
        assert!(r.is_duplicate);
        assert_eq!(r.action, KeywordAction::AngleChanged);
        assert_eq!(r.similarity_score, 1.0);
        assert_eq!(r.freshness_score, 0.0);
        assert_eq!(r.angle, "price_segment");
        assert!(r.modifier.is_some());
        assert_ne!(r.processed_keyword, r.original_keyword);
        assert!(r.reason.contains("stem overlap 1.00"));
        assert!(r.reason.contains("title similarity 1.00"));
    }

    #[test]
    fn blank_keyword_is_rejected() {
        let mut dedup = KeywordDeduplicator::in_memory(KeywordConfig::default()).unwrap();
        assert_eq!(
            dedup.process("   ", "c", "s").unwrap_err(),
            KeywordError::EmptyKeyword
        );
    }

    #[test]
    fn batch_skips_blank_entries() {
        let mut dedup = KeywordDeduplicator::in_memory(KeywordConfig::default()).unwrap();
        let results = dedup
            .process_batch(&[
                KeywordRequest::new("smart plug energy monitoring", "plugs", "youtube"),
                KeywordRequest::new("  ", "plugs", "youtube"),
                KeywordRequest::new("video doorbell outdoor camera", "doorbells", "google"),
            ])
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.is_duplicate));
    }

    #[test]
    fn activity_and_cleanup() {
        let mut dedup = KeywordDeduplicator::in_memory(KeywordConfig::default()).unwrap();
        dedup
            .process_at("robot vacuum pet hair", "vacuums", "s", t0() - Duration::days(45))
            .unwrap();
        dedup
            .process_at("smart plug alexa", "plugs", "s", t0())
            .unwrap();
        dedup
            .process_at("smart plug alexa", "plugs", "s", t0())
            .unwrap();

        let activity = dedup.recent_activity_at(7, t0()).unwrap();
        assert_eq!(activity.recent_processing.total_processed, 2);
        assert_eq!(activity.recent_processing.duplicates_found, 1);
        assert_eq!(activity.recent_processing.angles_changed, 1);
        assert_eq!(activity.stems.total_records, 3);
        assert_eq!(activity.angles.axis_count, 8);

        let report = dedup.cleanup_at(30, t0()).unwrap();
        assert_eq!(report, CleanupReport { stems_removed: 1, titles_removed: 1 });
        assert_eq!(dedup.stem_store().len(), 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = KeywordConfig {
            novelty_penalty: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            KeywordDeduplicator::in_memory(cfg),
            Err(KeywordError::InvalidConfig(_))
        ));
    }
}
