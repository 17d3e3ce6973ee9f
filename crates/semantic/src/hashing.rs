use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{Embedder, SemanticConfig, SemanticError};

/// Deterministic bag-of-words embedder using signed feature hashing.
///
/// Each whitespace-separated word lands in bucket `fxhash(word) % dim` with a
/// sign taken from the hash's top bit, so texts sharing vocabulary share
/// buckets. No model files, no network, same vector on every run.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    model_name: String,
    dimension: usize,
    normalize: bool,
}

impl HashingEmbedder {
    pub fn new(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;
        Ok(Self {
            model_name: cfg.model_name.clone(),
            dimension: cfg.dimension,
            normalize: cfg.normalize,
        })
    }
}

impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let mut v = vec![0f32; self.dimension];
        for word in text.split_whitespace() {
            let h = hash64(word.as_bytes());
            let idx = (h % self.dimension as u64) as usize;
            if h >> 63 == 1 {
                v[idx] -= 1.0;
            } else {
                v[idx] += 1.0;
            }
        }
        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        Ok(v)
    }
}
