//! # dupgate lexical fingerprints
//!
//! Pure, deterministic text signals used by the duplicate detector:
//!
//! - a 64-bit word-shingle SimHash ([`simhash64`]) and its Hamming distance,
//! - sparse term vectors with optional smoothed TF-IDF weighting
//!   ([`term_vector`], [`Vocabulary`]) compared with [`cosine_similarity`],
//! - word-set [`jaccard_similarity`] for titles.
//!
//! Every function here is a pure function of its inputs. There is no I/O and
//! no clock or global state, so the same text and shingle size always yield
//! bit-identical output.
//!
//! ```
//! use perceptual::{cosine_similarity, hamming_distance, simhash64, term_vector};
//!
//! let a = "Smart plugs let you schedule lamps from your phone.";
//! let b = "smart plugs let you schedule lamps from your phone";
//! assert_eq!(hamming_distance(simhash64(a, 5), simhash64(b, 5)), 0);
//!
//! let va = term_vector(&canonical::normalize(a), None);
//! let vb = term_vector(&canonical::normalize(b), None);
//! assert!((cosine_similarity(&va, &vb) - 1.0).abs() < 1e-12);
//! ```

mod shingles;
mod simhash;
mod vector;

pub use crate::shingles::shingle_hashes;
pub use crate::simhash::{
    hamming_distance, simhash64, simhash_from_hashes, simhash_similarity, simhash_words,
};
pub use crate::vector::{cosine_similarity, jaccard_similarity, term_vector, TermVector, Vocabulary};

/// Seed of the per-shingle hash. Changing it changes every fingerprint, so
/// cached SimHashes would have to be discarded.
pub const SIMHASH_SEED: u64 = 0xF00D_BAAD_F00D_BAAD;

/// Default words per shingle.
pub const DEFAULT_SHINGLE_SIZE: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_noise_does_not_change_fingerprint() {
        let plain = "installing a smart thermostat takes about an hour with basic tools";
        let marked = "**Installing** a smart _thermostat_ takes about an hour with `basic` tools!";
        assert_eq!(
            simhash64(plain, DEFAULT_SHINGLE_SIZE),
            simhash64(marked, DEFAULT_SHINGLE_SIZE)
        );
    }
}
