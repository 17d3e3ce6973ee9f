//! Single-file JSON persistence for the fingerprint cache.
//!
//! # Layout
//! ```json
//! {
//!   "version": 1,
//!   "fingerprints": {
//!     "<sha256 hex>": {
//!       "content_hash": "<sha256 hex>",
//!       "simhash": 1234567890,
//!       "embedding": null,
//!       "created_at": "2024-05-01T00:00:00Z",
//!       "source_path": "articles/post.md"
//!     }
//!   }
//! }
//! ```
//!
//! Keys are written in sorted order so the file diffs cleanly. Writes go to a
//! sibling temp file that is then renamed over the target.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::{FingerprintMap, StoreBackend};
use crate::{FingerprintCacheEntry, StoreError, STORE_SCHEMA_VERSION};

#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    fingerprints: BTreeMap<String, FingerprintCacheEntry>,
}

/// Persists the cache as one JSON document at `path`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "fingerprints.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StoreBackend for JsonFileBackend {
    fn load(&self) -> Result<FingerprintMap, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(FingerprintMap::new()),
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };
        let file: StoreFile =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))?;
        if file.version != STORE_SCHEMA_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: file.version,
                expected: STORE_SCHEMA_VERSION,
            });
        }
        Ok(file.fingerprints.into_iter().collect())
    }

    fn persist(&self, entries: &FingerprintMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        let file = StoreFile {
            version: STORE_SCHEMA_VERSION,
            fingerprints: entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        let json =
            serde_json::to_vec_pretty(&file).map_err(|e| StoreError::Encode(e.to_string()))?;
        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}
