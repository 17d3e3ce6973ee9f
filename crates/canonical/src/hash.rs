//! SHA-256 content identity.
//!
//! Two documents are exact duplicates iff their normalized texts hash to the
//! same digest under the same normalization version:
//!
//! ```text
//! SHA-256(version.to_be_bytes() || 0x00 || normalized_text_bytes)
//! ```
//!
//! ```rust
//! use canonical::{hash_canonical_bytes, hash_text};
//!
//! assert_eq!(hash_text("hello world").len(), 64);
//! assert_ne!(
//!     hash_canonical_bytes(1, b"hello world"),
//!     hash_canonical_bytes(2, b"hello world"),
//! );
//! ```

use sha2::{Digest, Sha256};

/// Hash arbitrary text with SHA-256 and return a hex digest.
///
/// Version-agnostic; use [`hash_canonical_bytes`] for document identity.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute the identity hash for normalized text produced under
/// `canonical_version`.
///
/// Same text with different versions yields different hashes, so a cache
/// keyed by this digest never mixes outputs of two normalization versions.
pub fn hash_canonical_bytes(canonical_version: u32, canonical_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_version.to_be_bytes());
    hasher.update([0]);
    hasher.update(canonical_bytes);
    hex::encode(hasher.finalize())
}
