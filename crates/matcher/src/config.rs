use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::DetectionError;

/// Which comparison strategy to run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Chronological base-versus-rest sweep.
    #[default]
    Linear,
    /// Full pairwise matrix plus connected components.
    Graph,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Algorithm::Linear => "linear",
            Algorithm::Graph => "graph",
        })
    }
}

impl FromStr for Algorithm {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Algorithm::Linear),
            "graph" => Ok(Algorithm::Graph),
            other => Err(DetectionError::InvalidConfig(format!(
                "unknown algorithm '{other}' (expected linear or graph)"
            ))),
        }
    }
}

/// Knobs for scoring and detection.
///
/// Serde-friendly so it can be embedded in the YAML config; missing fields
/// take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum overall similarity for a same-topic (or unclassified) pair to
    /// count as a duplicate.
    pub similarity_threshold: f64,
    /// Stricter threshold for pairs classified into different topics.
    pub cross_topic_threshold: f64,
    /// Pairs further apart than this many days are never compared.
    pub comparison_window_days: u32,
    /// Word-count floor; shorter documents are never compared.
    pub min_content_length: usize,
    pub title_weight: f64,
    pub content_weight: f64,
    pub algorithm: Algorithm,
    /// Build the Graph matrix rows on the rayon pool.
    pub parallel: bool,
    /// A topic wins only when more than this fraction of its keywords match.
    pub min_topic_coverage: f64,
    /// Topic name to keyword list, in priority order. Empty disables
    /// cross-topic handling.
    pub topics: IndexMap<String, Vec<String>>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
            cross_topic_threshold: 0.85,
            comparison_window_days: 90,
            min_content_length: 1000,
            title_weight: 0.3,
            content_weight: 0.7,
            algorithm: Algorithm::Linear,
            parallel: false,
            min_topic_coverage: 0.1,
            topics: IndexMap::new(),
        }
    }
}

impl DetectionConfig {
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_window_days(mut self, days: u32) -> Self {
        self.comparison_window_days = days;
        self
    }

    pub fn with_min_content_length(mut self, words: usize) -> Self {
        self.min_content_length = words;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_topic<I, S>(mut self, name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics
            .insert(name.into(), keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Validate thresholds, weights and the window.
    pub fn validate(&self) -> Result<(), DetectionError> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(DetectionError::InvalidConfig(format!(
                    "{name} must be between 0.0 and 1.0 (got {value})"
                )))
            }
        };
        unit("similarity_threshold", self.similarity_threshold)?;
        unit("cross_topic_threshold", self.cross_topic_threshold)?;
        unit("title_weight", self.title_weight)?;
        unit("content_weight", self.content_weight)?;
        unit("min_topic_coverage", self.min_topic_coverage)?;
        if self.title_weight + self.content_weight <= 0.0 {
            return Err(DetectionError::InvalidConfig(
                "title_weight + content_weight must be greater than zero".into(),
            ));
        }
        if self.comparison_window_days == 0 {
            return Err(DetectionError::InvalidConfig(
                "comparison_window_days must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
