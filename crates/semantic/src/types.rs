use serde::{Deserialize, Serialize};

/// Embedding output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemanticEmbedding {
    /// Identifier of the processed document.
    pub doc_id: String,
    pub vector: Vec<f32>,
    /// Name of the embedder that produced the vector.
    pub model_name: String,
    /// Dimension of `vector`.
    pub embedding_dim: usize,
    /// Whether [`vector`](Self::vector) was L2-normalized.
    pub normalized: bool,
}

/// What an embedder needs to know about one side of a pair.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddingInput<'a> {
    /// Cache key.
    pub content_hash: &'a str,
    pub text: &'a str,
}
