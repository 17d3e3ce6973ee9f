//! # dupgate keyword layer (`keyword`)
//!
//! Stops a content pipeline from publishing the same idea twice in a short
//! period. Each candidate keyword is checked two ways:
//!
//! - **Stem overlap** ([`StemStore`]): the share of the keyword's Porter stems
//!   already used in the last 30 days.
//! - **Title similarity** ([`TitleStore`]): SimHash similarity of the
//!   synthesized title `"{keyword} buyer's guide"` against titles from the
//!   last 7 days.
//!
//! A keyword that trips either check is rewritten along a content angle
//! ([`AngleAxis`]) not used recently in its category, and carries a novelty
//! penalty. Everything kept is recorded, and every decision is appended to a
//! JSON Lines audit log.
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use keyword::{KeywordAction, KeywordConfig, KeywordDeduplicator};
//!
//! let mut dedup = KeywordDeduplicator::in_memory(KeywordConfig::default()).unwrap();
//! let day0 = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
//!
//! dedup.process_at("smart plug alexa", "smart_plugs", "reddit", day0).unwrap();
//! let second = dedup
//!     .process_at("smart plug alexa compatible", "smart_plugs", "reddit", day0 + Duration::days(2))
//!     .unwrap();
//!
//! assert_eq!(second.action, KeywordAction::AngleChanged);
//! assert_ne!(second.angle, "general");
//! ```

mod angles;
mod audit;
mod config;
mod deduplicator;
mod error;
mod jsonl;
mod stemmer;
mod stems;
mod titles;

pub use crate::angles::{
    apply_variation, catalog_statistics, force_angle_change, generate_variations, suggest_angles,
    AngleAxis, AngleCatalogStats, AngleChange, AngleSuggestion, AngleVariation, NOVELTY_PENALTY,
};
pub use crate::audit::{AuditEntry, AuditLog, AuditSummary};
pub use crate::config::KeywordConfig;
pub use crate::deduplicator::{
    ActivitySummary, CleanupReport, DeduplicationResult, KeywordAction, KeywordDeduplicator,
    KeywordRequest, KeywordStats, GENERAL_ANGLE,
};
pub use crate::error::KeywordError;
pub use crate::stemmer::porter_stem;
pub use crate::stems::{extract_stems, KeywordStemRecord, OverlapCheck, StemStore, StemStoreStats};
pub use crate::titles::{
    synthesize_title, title_fingerprint, TitleCheck, TitleFingerprintRecord, TitleStore,
    TitleStoreStats,
};
