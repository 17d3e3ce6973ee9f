//! dupgate semantic signal
//!
//! An optional, best-effort similarity signal layered on top of the lexical
//! scorer. It only ever fills in `semantic_similarity` on a result; it never
//! decides whether a pair is a duplicate.
//!
//! - [`Embedder`] is the seam: anything that turns text into a fixed-size
//!   vector.
//! - [`HashingEmbedder`] is the built-in implementation: signed feature
//!   hashing over words. Deterministic, no model files, no network.
//! - [`CachedEmbedder`] stores vectors on the fingerprint-store entry of the
//!   same content hash so unchanged articles are embedded once.
//!
//! Failures degrade to "no score": [`SemanticSimilarity::similarity`] returns
//! `None` and logs a warning.
//!
//! ## Quick example
//!
//! ```
//! use semantic::{semanticize, SemanticConfig};
//!
//! let cfg = SemanticConfig::default().with_enabled(true);
//! let embedding = semanticize("doc-1", "smart plugs save energy", &cfg).unwrap();
//! assert_eq!(embedding.embedding_dim, 256);
//! assert!(embedding.normalized);
//! ```

mod cache;
mod config;
mod error;
mod hashing;
mod normalize;
mod types;

pub use crate::cache::CachedEmbedder;
pub use crate::config::SemanticConfig;
pub use crate::error::SemanticError;
pub use crate::hashing::HashingEmbedder;
pub use crate::normalize::embedding_similarity;
pub use crate::types::{EmbeddingInput, SemanticEmbedding};

/// Turns text into a fixed-size vector.
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;
    fn dimension(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError>;
}

/// Pairwise semantic score used by the scorer.
///
/// Returns `None` whenever a score cannot be produced.
pub trait SemanticSimilarity: Send + Sync {
    fn similarity(&self, a: &EmbeddingInput<'_>, b: &EmbeddingInput<'_>) -> Option<f64>;
}

/// Embed one document with the built-in hashing embedder.
pub fn semanticize(
    doc_id: &str,
    text: &str,
    cfg: &SemanticConfig,
) -> Result<SemanticEmbedding, SemanticError> {
    let embedder = HashingEmbedder::new(cfg)?;
    let vector = embedder.embed(text)?;
    Ok(SemanticEmbedding {
        doc_id: doc_id.to_string(),
        embedding_dim: vector.len(),
        vector,
        model_name: cfg.model_name.clone(),
        normalized: cfg.normalize,
    })
}
