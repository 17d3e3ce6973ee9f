use serde::{Deserialize, Serialize};

use crate::{AngleAxis, KeywordError, NOVELTY_PENALTY};

/// Windows and thresholds of the keyword layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeywordConfig {
    pub stem_window_days: u32,
    /// Share of a keyword's stems already seen in the window.
    pub stem_overlap_threshold: f64,
    pub title_window_days: u32,
    /// `1 - hamming / 64` between synthesized titles.
    pub title_similarity_threshold: f64,
    /// How far back angles count as recently used.
    pub angle_window_days: u32,
    pub novelty_penalty: f64,
    /// Axes tried first when a keyword must be re-angled.
    pub preferred_axes: Vec<AngleAxis>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            stem_window_days: 30,
            stem_overlap_threshold: 0.7,
            title_window_days: 7,
            title_similarity_threshold: 0.85,
            angle_window_days: 7,
            novelty_penalty: NOVELTY_PENALTY,
            preferred_axes: Vec::new(),
        }
    }
}

impl KeywordConfig {
    pub fn with_preferred_axes(mut self, axes: Vec<AngleAxis>) -> Self {
        self.preferred_axes = axes;
        self
    }

    pub fn validate(&self) -> Result<(), KeywordError> {
        for (name, value) in [
            ("stem_overlap_threshold", self.stem_overlap_threshold),
            ("title_similarity_threshold", self.title_similarity_threshold),
            ("novelty_penalty", self.novelty_penalty),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(KeywordError::InvalidConfig(format!(
                    "{name} must be between 0.0 and 1.0 (got {value})"
                )));
            }
        }
        if self.stem_window_days == 0 || self.title_window_days == 0 {
            return Err(KeywordError::InvalidConfig(
                "stem_window_days and title_window_days must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
