use thiserror::Error;

/// Errors surfaced by embedders.
///
/// The semantic signal is best-effort: callers on the duplicate-detection
/// path turn any of these into "no semantic score" rather than failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// Configuration is inconsistent (e.g. a zero dimension).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// An embedder returned a vector of the wrong size.
    #[error("embedding dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// The embedder could not produce a vector.
    #[error("inference failure: {0}")]
    Inference(String),
}
