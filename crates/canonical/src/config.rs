//! Configuration types for text normalization.
//!
//! [`NormalizeConfig`] controls which transforms [`normalize_with`] applies.
//! The `version` field is folded into every content hash, so any change to
//! normalization output must be accompanied by a version bump. Otherwise
//! hashes computed by an old build would silently collide with hashes of a
//! differently normalized text.
//!
//! # Examples
//!
//! ```rust
//! use canonical::NormalizeConfig;
//!
//! let config = NormalizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert!(config.strip_markup);
//!
//! let keep_urls = NormalizeConfig::new().with_strip_urls(false);
//! assert!(!keep_urls.strip_urls);
//! ```
//!
//! [`normalize_with`]: crate::normalize_with

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// Configuration for the normalization pipeline.
///
/// ```json
/// {
///   "version": 1,
///   "normalize_unicode": true,
///   "lowercase": true,
///   "strip_urls": true,
///   "strip_markup": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Normalization behavior version. Must be >= 1.
    ///
    /// Included in the identity hash:
    /// ```text
    /// SHA-256(version.to_be_bytes() || 0x00 || normalized_text_bytes)
    /// ```
    pub version: u32,

    /// Apply Unicode NFKC normalization before any other transform.
    ///
    /// Composed and decomposed forms of the same character ("é" as U+00E9 and
    /// "e" + U+0301) normalize to the same text and therefore the same hash.
    pub normalize_unicode: bool,

    /// Apply locale-free Unicode lowercasing.
    pub lowercase: bool,

    /// Remove `http(s)://` and `www.` URLs.
    pub strip_urls: bool,

    /// Remove markdown syntax characters (`#`, `*`, backticks, brackets and
    /// parentheses) and replace remaining punctuation and symbols, except
    /// hyphens, with spaces.
    pub strip_markup: bool,
}

impl NormalizeConfig {
    /// Create a configuration with the default transforms enabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    pub fn with_lowercase(mut self, enabled: bool) -> Self {
        self.lowercase = enabled;
        self
    }

    pub fn with_strip_urls(mut self, enabled: bool) -> Self {
        self.strip_urls = enabled;
        self
    }

    pub fn with_strip_markup(mut self, enabled: bool) -> Self {
        self.strip_markup = enabled;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            lowercase: true,
            strip_urls: true,
            strip_markup: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_every_transform() {
        let cfg = NormalizeConfig::default();
        assert_eq!(cfg.version, 1);
        assert!(cfg.normalize_unicode);
        assert!(cfg.lowercase);
        assert!(cfg.strip_urls);
        assert!(cfg.strip_markup);
    }

    #[test]
    fn builder_chain() {
        let cfg = NormalizeConfig::new()
            .with_version(3)
            .with_unicode_normalization(false)
            .with_lowercase(false)
            .with_strip_urls(false)
            .with_strip_markup(false);

        assert_eq!(cfg.version, 3);
        assert!(!cfg.normalize_unicode);
        assert!(!cfg.lowercase);
        assert!(!cfg.strip_urls);
        assert!(!cfg.strip_markup);
    }

    #[test]
    fn version_zero_rejected() {
        let cfg = NormalizeConfig::new().with_version(0);
        assert!(matches!(
            cfg.validate(),
            Err(CanonicalError::InvalidConfig(_))
        ));
    }
}
