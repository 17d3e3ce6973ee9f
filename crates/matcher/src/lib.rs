//! # dupgate matcher (`matcher`)
//!
//! Pairwise scoring and batch duplicate detection over analyzed
//! [`Document`](ingest::Document)s.
//!
//! ## Core Types
//!
//! - [`DetectionConfig`]: thresholds, weights, comparison window, length floor,
//!   strategy selection and the topic catalog.
//! - [`Scorer`]: scores one pair. Title Jaccard and body TF-IDF cosine are
//!   blended into `overall_similarity`; pairs classified into different topics
//!   must clear the stricter `cross_topic_threshold`.
//! - [`TopicClassifier`]: keyword-coverage topic assignment.
//! - [`DuplicateDetectionStrategy`]: the strategy seam, with two
//!   implementations:
//!   - [`LinearStrategy`]: the earliest document absorbs later duplicates of
//!     itself, then the next survivor becomes the base.
//!   - [`GraphStrategy`]: full similarity matrix, duplicate edges, connected
//!     components.
//! - [`CancellationToken`]: cooperative cancellation polled between pairs.
//! - [`SimilarityStats`]: summary of a run's pairwise similarities.
//!
//! ## Example Usage
//!
//! ```
//! use ingest::{analyze, AnalyzerConfig, DocumentSource};
//! use matcher::{strategy_for, Algorithm, DetectionConfig, DetectionContext};
//!
//! let body = "Smart plugs let you schedule lamps and fans from your phone.";
//! let analyzer = AnalyzerConfig::default();
//! let docs = vec![
//!     analyze(DocumentSource::text("2024-01-01-plugs", body), &analyzer).unwrap(),
//!     analyze(DocumentSource::text("2024-01-05-plugs-copy", body), &analyzer).unwrap(),
//! ];
//!
//! let cfg = DetectionConfig::default()
//!     .with_algorithm(Algorithm::Linear)
//!     .with_min_content_length(5);
//! let outcome = strategy_for(cfg.algorithm)
//!     .detect(&docs, &DetectionContext::new(&cfg))
//!     .unwrap();
//! let result = outcome.completed().unwrap();
//! assert_eq!(result.duplicate_count(), 1);
//! ```

mod cancel;
mod config;
mod error;
mod graph;
mod linear;
mod score;
mod stats;
mod strategy;
mod topic;

pub use crate::cancel::CancellationToken;
pub use crate::config::{Algorithm, DetectionConfig};
pub use crate::error::DetectionError;
pub use crate::graph::GraphStrategy;
pub use crate::linear::LinearStrategy;
pub use crate::score::{batch_vocabulary, PreparedDocument, Scorer, SimilarityResult, SkipReason};
pub use crate::stats::SimilarityStats;
pub use crate::strategy::{
    strategy_for, DetectionContext, DetectionResult, DuplicateDetectionStrategy, DuplicateGroup,
    GroupMember, MemberRecord, Outcome, SimilarityMatrix,
};
pub use crate::topic::TopicClassifier;

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;
    use ingest::{DateSource, Document};

    pub(crate) const PLUG_BODY: &str = "Smart plugs let you schedule lamps and fans from \
        your phone while tracking how much energy each appliance draws over a week.";

    pub(crate) const BREAD_BODY: &str = "Baking sourdough bread takes patience, a lively \
        starter and an oven hot enough to set the crust before the loaf collapses.";

    /// A hand-built document dated at midnight UTC on `date`.
    pub(crate) fn doc(id: &str, title: &str, body: &str, date: &str) -> Document {
        let normalized = canonical::normalize(body);
        let effective_date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .expect("test date")
            .and_hms_opt(0, 0, 0)
            .expect("midnight")
            .and_utc();
        Document {
            id: id.to_string(),
            path: None,
            file_name: id.to_string(),
            title: title.to_string(),
            raw_text: body.to_string(),
            content_text: body.to_string(),
            word_count: body.split_whitespace().count(),
            content_hash: canonical::hash_text(&normalized),
            simhash: perceptual::simhash64(body, 5),
            normalized_text: normalized,
            effective_date,
            date_source: DateSource::Declared,
            topic_hint: None,
        }
    }

    #[test]
    fn strategy_names() {
        use crate::{strategy_for, Algorithm};
        assert_eq!(strategy_for(Algorithm::Linear).name(), "linear");
        assert_eq!(strategy_for(Algorithm::Graph).name(), "graph");
    }
}
