//! Error types produced by the document analyzer.
//!
//! Only unreadable input is an error. Degraded input (malformed front matter,
//! missing dates, no title) resolves through documented fallbacks and is
//! logged instead.

use thiserror::Error;

/// Errors that can occur while analyzing a document or scanning a directory.
///
/// Variants carry paths as strings so the enum stays `Clone + Eq` and can be
/// collected into per-document failure lists.
///
/// ```rust
/// use ingest::AnalysisError;
///
/// let err = AnalysisError::InvalidUtf8 { path: "post.md".into() };
/// assert_eq!(err.to_string(), "post.md is not valid UTF-8");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnalysisError {
    /// The file could not be read.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// The file is not UTF-8 text.
    #[error("{path} is not valid UTF-8")]
    InvalidUtf8 { path: String },

    /// The scan root is missing, not a directory, or unreadable.
    #[error("directory not found or unreadable: {path}")]
    DirectoryNotFound { path: String },

    /// The analyzer configuration failed validation.
    #[error("invalid analyzer config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = AnalysisError::Io {
            path: "/tmp/a.md".into(),
            message: "permission denied".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/a.md"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn errors_are_comparable() {
        let a = AnalysisError::DirectoryNotFound { path: "x".into() };
        assert_eq!(a.clone(), a);
        assert_ne!(a, AnalysisError::InvalidConfig("x".into()));
    }
}
