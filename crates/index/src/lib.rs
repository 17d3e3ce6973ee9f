//! # dupgate fingerprint store
//!
//! A content-hash keyed cache of SimHash fingerprints (and, optionally,
//! semantic embeddings) so unchanged articles are not re-fingerprinted on
//! every run.
//!
//! ## Core Features
//!
//! - **Pluggable Backends**: persistence sits behind the [`StoreBackend`]
//!   trait. Out of the box there is an in-memory backend (ideal for tests)
//!   and a JSON file backend.
//! - **Single entry point**: [`FingerprintStore::get_or_compute`] returns the
//!   cached entry or runs the supplied closure and caches its result.
//! - **Degrades, never fails, on open**: a corrupt or unreadable cache file is
//!   logged and treated as empty.
//! - **Age-based eviction**: entries are never refreshed; [`FingerprintStore::evict`]
//!   drops those created before a cutoff.
//! - **Parameter pinning**: a store opened [`with_shingle_size`](FingerprintStore::with_shingle_size)
//!   discards entries fingerprinted under another shingle size and never
//!   serves them.
//!
//! ## Concurrency
//!
//! Reads take a read lock. A miss computes *outside* the lock and then takes
//! the write lock to insert, so two threads missing on the same hash may both
//! compute; the last write wins. Both computations are deterministic, so the
//! outcome is the same either way.
//!
//! ## Example Usage
//!
//! ```
//! use index::{FingerprintStore, StoreConfig};
//!
//! let store = FingerprintStore::open(StoreConfig::in_memory().build());
//! let entry = store
//!     .get_or_compute("abc123", Some("post.md"), || Ok::<_, std::convert::Infallible>(0xFEED))
//!     .unwrap();
//! assert_eq!(entry.simhash, 0xFEED);
//!
//! // Second lookup is served from the cache; the closure is not called.
//! let cached = store
//!     .get_or_compute("abc123", None, || -> Result<u64, std::convert::Infallible> {
//!         unreachable!()
//!     })
//!     .unwrap();
//! assert_eq!(cached.simhash, 0xFEED);
//! ```

mod backend;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use backend::{FingerprintMap, InMemoryBackend, JsonFileBackend, StoreBackend, StoreConfig};

/// Bump this value whenever the persisted entry layout changes.
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// One cached fingerprint.
///
/// Created on first computation and never refreshed; an edited article has a
/// new content hash and therefore a new entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FingerprintCacheEntry {
    /// SHA-256 hex of the normalized text. Also the map key.
    pub content_hash: String,
    pub simhash: u64,
    /// Shingle size the SimHash was computed with; 0 when unknown.
    #[serde(default)]
    pub shingle_size: usize,
    /// Optional semantic signal, attached after the fact.
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
    /// Where the text came from when first seen.
    #[serde(default)]
    pub source_path: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Serialization encode error: {0}")]
    Encode(String),
    #[error("Serialization decode error: {0}")]
    Decode(String),
    #[error("unsupported store version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Retention used when none is configured: twice the comparison window, so
/// every document that can still be compared keeps its cache entry.
pub fn default_retention(comparison_window_days: u32) -> Duration {
    Duration::from_secs(u64::from(comparison_window_days) * 2 * 86_400)
}

/// Lookup counters of a [`FingerprintStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    /// Lookups made after `earlier` was taken.
    pub fn since(&self, earlier: &CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits.saturating_sub(earlier.hits),
            misses: self.misses.saturating_sub(earlier.misses),
        }
    }
}

/// In-memory working set over a [`StoreBackend`].
pub struct FingerprintStore {
    backend: Box<dyn StoreBackend>,
    entries: RwLock<FingerprintMap>,
    dirty: AtomicBool,
    shingle_size: Option<usize>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl FingerprintStore {
    /// Load the backend's entries. Load failures are logged and yield an empty
    /// cache.
    pub fn open(backend: Box<dyn StoreBackend>) -> Self {
        let entries = match backend.load() {
            Ok(entries) => {
                log::debug!(
                    "fingerprint store opened: backend={} entries={}",
                    backend.name(),
                    entries.len()
                );
                entries
            }
            Err(err) => {
                log::warn!(
                    "fingerprint store unreadable, starting empty: backend={} error={}",
                    backend.name(),
                    err
                );
                FingerprintMap::new()
            }
        };
        Self {
            backend,
            entries: RwLock::new(entries),
            dirty: AtomicBool::new(false),
            shingle_size: None,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Pin the store to SimHashes computed with `shingle_size`. Loaded
    /// entries computed otherwise are dropped; the next flush rewrites the
    /// file without them.
    pub fn with_shingle_size(mut self, shingle_size: usize) -> Self {
        let entries = self
            .entries
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.shingle_size == shingle_size);
        let dropped = before - entries.len();
        if dropped > 0 {
            log::warn!(
                "dropped {dropped} fingerprint(s) not computed with shingle size {shingle_size}"
            );
            *self.dirty.get_mut() = true;
        }
        self.shingle_size = Some(shingle_size);
        self
    }

    /// Build the configured backend and open it.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::open(config.build())
    }

    /// Return the cached entry for `content_hash`, computing and caching the
    /// SimHash on a miss. Errors from `compute` are returned untouched and
    /// nothing is cached. On a pinned store an entry with another shingle size
    /// counts as a miss and is replaced.
    pub fn get_or_compute<F, E>(
        &self,
        content_hash: &str,
        source_path: Option<&str>,
        compute: F,
    ) -> Result<FingerprintCacheEntry, E>
    where
        F: FnOnce() -> Result<u64, E>,
    {
        if let Some(hit) = self.get(content_hash).filter(|entry| self.matches(entry)) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let simhash = compute()?;
        let entry = FingerprintCacheEntry {
            content_hash: content_hash.to_string(),
            simhash,
            shingle_size: self.shingle_size.unwrap_or(0),
            embedding: None,
            created_at: Utc::now(),
            source_path: source_path.map(str::to_string),
        };
        let mut guard = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(content_hash.to_string(), entry.clone());
        self.dirty.store(true, Ordering::Release);
        Ok(entry)
    }

    fn matches(&self, entry: &FingerprintCacheEntry) -> bool {
        self.shingle_size
            .is_none_or(|shingle_size| entry.shingle_size == shingle_size)
    }

    /// Hits and misses of [`get_or_compute`](Self::get_or_compute) so far.
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn get(&self, content_hash: &str) -> Option<FingerprintCacheEntry> {
        let guard = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.get(content_hash).cloned()
    }

    /// Insert an entry as-is, replacing any previous one.
    pub fn insert(&self, entry: FingerprintCacheEntry) {
        let mut guard = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(entry.content_hash.clone(), entry);
        self.dirty.store(true, Ordering::Release);
    }

    /// Store an embedding on an existing entry. Returns `false` when the hash
    /// is not cached.
    pub fn attach_embedding(&self, content_hash: &str, embedding: Vec<f32>) -> bool {
        let mut guard = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.get_mut(content_hash) {
            Some(entry) => {
                entry.embedding = Some(embedding);
                self.dirty.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Remove entries created more than `older_than` ago. Returns the number
    /// removed.
    pub fn evict(&self, older_than: Duration) -> usize {
        let Ok(age) = chrono::Duration::from_std(older_than) else {
            return 0;
        };
        match Utc::now().checked_sub_signed(age) {
            Some(cutoff) => self.evict_before(cutoff),
            None => 0,
        }
    }

    /// Remove entries with `created_at < cutoff`.
    pub fn evict_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut guard = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = guard.len();
        guard.retain(|_, entry| entry.created_at >= cutoff);
        let removed = before - guard.len();
        if removed > 0 {
            self.dirty.store(true, Ordering::Release);
            log::info!("evicted {removed} fingerprint(s) created before {cutoff}");
        }
        removed
    }

    /// Persist the working set if anything changed since the last flush.
    pub fn flush(&self) -> Result<(), StoreError> {
        if !self.dirty.load(Ordering::Acquire) {
            return Ok(());
        }
        let guard = self
            .entries
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        self.backend.persist(&guard)?;
        self.dirty.store(false, Ordering::Release);
        log::debug!(
            "fingerprint store flushed: backend={} entries={}",
            self.backend.name(),
            guard.len()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
