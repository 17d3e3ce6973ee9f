use std::sync::Arc;

use index::FingerprintStore;
use tracing::{debug, warn};

use crate::{embedding_similarity, Embedder, EmbeddingInput, SemanticError, SemanticSimilarity};

/// An [`Embedder`] whose vectors are cached on the fingerprint store entry of
/// the same content hash.
///
/// The cache is only written when the store already holds an entry for the
/// hash (the lexical fingerprint is always computed first). A cached vector
/// with the wrong dimension is ignored and recomputed.
pub struct CachedEmbedder<E> {
    inner: E,
    store: Arc<FingerprintStore>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, store: Arc<FingerprintStore>) -> Self {
        Self { inner, store }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Cached vector for `input`, computing and attaching it on a miss.
    pub fn embed_cached(&self, input: &EmbeddingInput<'_>) -> Result<Vec<f32>, SemanticError> {
        if let Some(cached) = self
            .store
            .get(input.content_hash)
            .and_then(|entry| entry.embedding)
            .filter(|v| v.len() == self.inner.dimension())
        {
            return Ok(cached);
        }

        let vector = self.inner.embed(input.text)?;
        if vector.len() != self.inner.dimension() {
            return Err(SemanticError::DimensionMismatch {
                expected: self.inner.dimension(),
                found: vector.len(),
            });
        }
        let attached = self
            .store
            .attach_embedding(input.content_hash, vector.clone());
        debug!(
            content_hash = input.content_hash,
            embedder = self.inner.name(),
            attached,
            "embedding_computed"
        );
        Ok(vector)
    }
}

impl<E: Embedder> SemanticSimilarity for CachedEmbedder<E> {
    fn similarity(&self, a: &EmbeddingInput<'_>, b: &EmbeddingInput<'_>) -> Option<f64> {
        let embed = |input: &EmbeddingInput<'_>| match self.embed_cached(input) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!(content_hash = input.content_hash, error = %err, "embedding_failed");
                None
            }
        };
        let va = embed(a)?;
        let vb = embed(b)?;
        embedding_similarity(&va, &vb)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use index::StoreConfig;

    use super::*;
    use crate::{HashingEmbedder, SemanticConfig};

    struct CountingEmbedder {
        inner: HashingEmbedder,
        calls: AtomicUsize,
    }

    impl Embedder for CountingEmbedder {
        fn name(&self) -> &str {
            "counting"
        }
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }
        fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed(text)
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn name(&self) -> &str {
            "failing"
        }
        fn dimension(&self) -> usize {
            8
        }
        fn embed(&self, _text: &str) -> Result<Vec<f32>, SemanticError> {
            Err(SemanticError::Inference("offline".into()))
        }
    }

    fn store_with(hashes: &[&str]) -> Arc<FingerprintStore> {
        let store = FingerprintStore::from_config(&StoreConfig::in_memory());
        for hash in hashes {
            store
                .get_or_compute(hash, None, || Ok::<_, SemanticError>(1))
                .unwrap();
        }
        Arc::new(store)
    }

    fn counting() -> CountingEmbedder {
        CountingEmbedder {
            inner: HashingEmbedder::new(&SemanticConfig::default()).unwrap(),
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn second_lookup_hits_store() {
        let store = store_with(&["h1"]);
        let cached = CachedEmbedder::new(counting(), Arc::clone(&store));
        let input = EmbeddingInput {
            content_hash: "h1",
            text: "smart plug",
        };
        let first = cached.embed_cached(&input).unwrap();
        let second = cached.embed_cached(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.get("h1").unwrap().embedding, Some(first));
    }

    #[test]
    fn unknown_hash_is_computed_but_not_cached() {
        let store = store_with(&[]);
        let cached = CachedEmbedder::new(counting(), Arc::clone(&store));
        let input = EmbeddingInput {
            content_hash: "missing",
            text: "x",
        };
        cached.embed_cached(&input).unwrap();
        cached.embed_cached(&input).unwrap();
        assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn failure_degrades_to_none() {
        let cached = CachedEmbedder::new(FailingEmbedder, store_with(&["a", "b"]));
        let a = EmbeddingInput {
            content_hash: "a",
            text: "one",
        };
        let b = EmbeddingInput {
            content_hash: "b",
            text: "two",
        };
        assert_eq!(cached.similarity(&a, &b), None);
    }

    #[test]
    fn identical_text_scores_one() {
        let cached = CachedEmbedder::new(counting(), store_with(&["a", "b"]));
        let a = EmbeddingInput {
            content_hash: "a",
            text: "robot vacuum for pet hair",
        };
        let b = EmbeddingInput {
            content_hash: "b",
            text: "robot vacuum for pet hair",
        };
        let sim = cached.similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }
}
