use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::{FingerprintCacheEntry, StoreError};

/// Entries keyed by content hash.
pub type FingerprintMap = HashMap<String, FingerprintCacheEntry>;

/// Persistence behind a [`FingerprintStore`](crate::FingerprintStore).
///
/// The store keeps its working set in memory; a backend only loads the whole
/// map at open time and persists it on flush.
pub trait StoreBackend: Send + Sync {
    /// Load every persisted entry. A backend with nothing stored yet returns
    /// an empty map.
    fn load(&self) -> Result<FingerprintMap, StoreError>;
    /// Replace the persisted state with `entries`.
    fn persist(&self, entries: &FingerprintMap) -> Result<(), StoreError>;
    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use index::StoreConfig;
///
/// // In-memory (for testing)
/// let config = StoreConfig::in_memory();
///
/// // JSON file next to the articles
/// let config = StoreConfig::json_file(".dupgate/fingerprints.json");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Nothing survives the process.
    #[default]
    InMemory,
    /// A single JSON document: `{"version": 1, "fingerprints": {hash: entry}}`.
    JsonFile { path: PathBuf },
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub fn json_file<P: Into<PathBuf>>(path: P) -> Self {
        StoreConfig::JsonFile { path: path.into() }
    }

    /// Build the backend this configuration describes.
    pub fn build(&self) -> Box<dyn StoreBackend> {
        match self {
            StoreConfig::InMemory => Box::new(InMemoryBackend::new()),
            StoreConfig::JsonFile { path } => Box::new(JsonFileBackend::new(path.clone())),
        }
    }
}

/// A backend holding the last persisted snapshot in a `RwLock`.
pub struct InMemoryBackend {
    snapshot: RwLock<FingerprintMap>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the backend, as if `entries` had been persisted earlier.
    pub fn with_entries(entries: FingerprintMap) -> Self {
        Self {
            snapshot: RwLock::new(entries),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for InMemoryBackend {
    fn load(&self) -> Result<FingerprintMap, StoreError> {
        let guard = self
            .snapshot
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.clone())
    }

    fn persist(&self, entries: &FingerprintMap) -> Result<(), StoreError> {
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        guard.clone_from(entries);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

/// JSON file persistence.
pub mod json_file;

pub use json_file::JsonFileBackend;
