//! Public data types of the analyzer.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// A file on disk; its path is the document id.
    Path(PathBuf),
    /// Raw text. Without an id, one is derived from the content hash.
    Text { id: Option<String>, text: String },
}

impl DocumentSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Text {
            id: Some(id.into()),
            text: text.into(),
        }
    }

    pub fn anonymous_text(text: impl Into<String>) -> Self {
        Self::Text {
            id: None,
            text: text.into(),
        }
    }
}

/// Which rule produced [`Document::effective_date`], highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// Front-matter `date`, `created`, `published` or `publish_date`.
    Declared,
    /// A `YYYY-MM-DD` or `YYYYMMDD` date in the file name.
    Filename,
    /// Filesystem creation time.
    Created,
    /// Filesystem modification time.
    Modified,
    /// Analysis time; used for raw text with no other date.
    Now,
}

/// An analyzed document.
///
/// Immutable once computed. A change to the source text shows up as a
/// different `content_hash`, and the document is analyzed again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Path string for files; given or derived id for raw text.
    pub id: String,
    pub path: Option<PathBuf>,
    pub file_name: String,
    pub title: String,
    /// The input exactly as read, front matter included.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub raw_text: String,
    /// Prose body after markdown and noise stripping; the scorer's input.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub content_text: String,
    /// `canonical::normalize(content_text)`.
    #[serde(skip_serializing)]
    #[serde(default)]
    pub normalized_text: String,
    pub word_count: usize,
    /// SHA-256 hex digest of `normalized_text`.
    pub content_hash: String,
    pub simhash: u64,
    pub effective_date: DateTime<Utc>,
    pub date_source: DateSource,
    /// Front-matter `topic` or `category`.
    pub topic_hint: Option<String>,
}

impl Document {
    /// Whole days between the two effective dates, ignoring direction.
    pub fn days_apart(&self, other: &Document) -> i64 {
        (self.effective_date - other.effective_date).num_days().abs()
    }
}

/// A file that could not be analyzed during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of [`scan_directory`](crate::scan_directory).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Analyzed documents in file-name order.
    pub documents: Vec<Document>,
    pub failures: Vec<DocumentFailure>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
