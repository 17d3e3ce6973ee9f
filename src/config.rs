//! YAML configuration file support for dupgate.
//!
//! Every stage reads its settings from one file. Each section is optional and
//! falls back to the stage defaults, so a minimal file is just the version.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # dupgate configuration
//! version: "1"
//! name: "garden blog"
//!
//! analyzer:
//!   extensions: ["md", "markdown"]
//!   recursive: false
//!   shingle_size: 5
//!
//! detection:
//!   algorithm: graph
//!   similarity_threshold: 0.7
//!   cross_topic_threshold: 0.85
//!   comparison_window_days: 90
//!   min_content_length: 1000
//!   title_weight: 0.3
//!   content_weight: 0.7
//!   parallel: true
//!   topics:
//!     smart-home: ["plug", "alexa", "thermostat"]
//!     kitchen: ["oven", "bread", "knife"]
//!
//! store:
//!   cache_path: ".dupgate/fingerprints.json"
//!   retention_days: 180
//!
//! processor:
//!   new_folder: "new-articles"
//!   old_folder: "old-articles"
//!
//! keyword:
//!   stem_window_days: 30
//!   stem_overlap_threshold: 0.7
//!   preferred_axes: ["price_segment", "use_case"]
//!
//! semantic:
//!   enabled: false
//!   dimension: 256
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use index::StoreConfig;
use ingest::AnalyzerConfig;
use keyword::KeywordConfig;
use matcher::DetectionConfig;
use semantic::SemanticConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file versions this build understands.
const SUPPORTED_VERSIONS: [&str; 2] = ["1", "1.0"];

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for a dupgate run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct DupgateConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    #[serde(default)]
    pub detection: DetectionConfig,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub processor: ProcessorConfig,

    #[serde(default)]
    pub keyword: KeywordConfig,

    #[serde(default)]
    pub semantic: SemanticConfig,
}

impl DupgateConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: DupgateConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the version and every section.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(ConfigLoadError::UnsupportedVersion(self.version.clone()));
        }

        self.analyzer.validate().map_err(validation)?;
        self.detection.validate().map_err(validation)?;
        self.keyword.validate().map_err(validation)?;
        self.semantic.validate().map_err(validation)?;
        self.store.validate()?;
        self.processor.validate()?;
        Ok(())
    }

    /// Backend selection for the fingerprint cache.
    pub fn store_config(&self) -> StoreConfig {
        match &self.store.cache_path {
            Some(path) => StoreConfig::json_file(path.clone()),
            None => StoreConfig::in_memory(),
        }
    }

    /// How long cache entries live. Defaults to twice the comparison window.
    pub fn retention(&self) -> Duration {
        match self.store.retention_days {
            Some(days) => Duration::from_secs(u64::from(days) * 86_400),
            None => index::default_retention(self.detection.comparison_window_days),
        }
    }
}

impl Default for DupgateConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            analyzer: AnalyzerConfig::default(),
            detection: DetectionConfig::default(),
            store: StoreSection::default(),
            processor: ProcessorConfig::default(),
            keyword: KeywordConfig::default(),
            semantic: SemanticConfig::default(),
        }
    }
}

/// Fingerprint cache settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreSection {
    /// JSON cache file. Without one the cache lives for the process only.
    pub cache_path: Option<PathBuf>,
    /// Evict entries older than this many days at the end of a run.
    pub retention_days: Option<u32>,
}

impl StoreSection {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.retention_days == Some(0) {
            return Err(ConfigLoadError::Validation(
                "store.retention_days must be >= 1".to_string(),
            ));
        }
        if let Some(path) = &self.cache_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigLoadError::Validation(
                    "store.cache_path must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Destination folders for `--auto-process`.
///
/// Relative folders resolve against the working directory. Each run adds a
/// `YYYY-MM-DD` subfolder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProcessorConfig {
    pub new_folder: PathBuf,
    pub old_folder: PathBuf,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            new_folder: PathBuf::from("new-articles"),
            old_folder: PathBuf::from("old-articles"),
        }
    }
}

impl ProcessorConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.new_folder.as_os_str().is_empty() || self.old_folder.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "processor folders must not be empty".to_string(),
            ));
        }
        if self.new_folder == self.old_folder {
            return Err(ConfigLoadError::Validation(
                "processor.new_folder and processor.old_folder must differ".to_string(),
            ));
        }
        Ok(())
    }
}

fn validation(err: impl std::fmt::Display) -> ConfigLoadError {
    ConfigLoadError::Validation(err.to_string())
}

fn default_version() -> String {
    "1".to_string()
}
