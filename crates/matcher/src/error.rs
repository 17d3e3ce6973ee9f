use thiserror::Error;

/// Errors produced by the detection layer.
///
/// Cancellation is not an error; see [`Outcome::Cancelled`](crate::Outcome).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectionError {
    /// Thresholds or weights outside `[0, 1]`, a zero-day window, or weights
    /// summing to zero.
    #[error("invalid detection config: {0}")]
    InvalidConfig(String),
    /// Nothing left to compare.
    #[error("no valid documents to compare")]
    NoValidDocuments,
}
