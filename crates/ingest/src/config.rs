//! Configuration for the document analyzer.
//!
//! [`AnalyzerConfig`] decides which files a scan picks up and how the
//! similarity fingerprint of each document is shingled. It is cheap to clone
//! and deserializes from the `analyzer` section of the YAML config.
//!
//! ```rust
//! use ingest::AnalyzerConfig;
//!
//! let cfg = AnalyzerConfig::default()
//!     .with_extensions(["md", "markdown"])
//!     .with_recursive(true);
//! assert!(cfg.validate().is_ok());
//! assert!(cfg.accepts(std::path::Path::new("notes/post.MARKDOWN")));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AnalysisError;

/// Runtime configuration for document analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Configuration schema version. Must be `>= 1`.
    ///
    /// Default: `1`
    pub version: u32,

    /// File extensions picked up by [`scan_directory`](crate::scan_directory),
    /// compared case-insensitively and without the leading dot.
    ///
    /// Default: `["md"]`
    pub extensions: Vec<String>,

    /// Descend into subdirectories while scanning.
    ///
    /// Default: `false`
    pub recursive: bool,

    /// Words per shingle for the document SimHash.
    ///
    /// Default: `5`
    pub shingle_size: usize,

    /// Namespace for UUIDv5 ids of raw-text documents submitted without an id.
    ///
    /// The id is `UUIDv5(namespace, content_hash)`, so resubmitting the same
    /// text yields the same id.
    ///
    /// Default: [`Uuid::NAMESPACE_OID`]
    pub doc_id_namespace: Uuid,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            extensions: vec!["md".to_string()],
            recursive: false,
            shingle_size: perceptual::DEFAULT_SHINGLE_SIZE,
            doc_id_namespace: Uuid::NAMESPACE_OID,
        }
    }
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_shingle_size(mut self, shingle_size: usize) -> Self {
        self.shingle_size = shingle_size;
        self
    }

    pub fn with_doc_id_namespace(mut self, namespace: Uuid) -> Self {
        self.doc_id_namespace = namespace;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidConfig`] for version 0, a zero shingle
    /// size, or an empty extension list.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.version == 0 {
            return Err(AnalysisError::InvalidConfig(
                "version must be >= 1".to_string(),
            ));
        }
        if self.shingle_size == 0 {
            return Err(AnalysisError::InvalidConfig(
                "shingle_size must be >= 1".to_string(),
            ));
        }
        if self.extensions.iter().all(|ext| normalize_extension(ext).is_empty()) {
            return Err(AnalysisError::InvalidConfig(
                "at least one file extension is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `path` carries one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|wanted| normalize_extension(wanted).eq_ignore_ascii_case(ext))
    }
}

fn normalize_extension(ext: &str) -> &str {
    ext.trim().trim_start_matches('.')
}
