//! 64-bit SimHash over word shingles.
//!
//! For each shingle hash `h` and each bit `i`, counter `i` is incremented when
//! bit `i` of `h` is set and decremented otherwise. The fingerprint sets bit
//! `i` iff counter `i` is strictly positive. Similar shingle multisets vote
//! similarly, so the Hamming distance between fingerprints tracks textual
//! dissimilarity.

use crate::shingles::shingle_hashes;
use crate::SIMHASH_SEED;

/// SimHash of `text` with [`SIMHASH_SEED`].
///
/// The text is normalized first. Returns `0` for empty input; callers must
/// treat `0` as "no signal", never as a real fingerprint.
///
/// ```rust
/// use perceptual::{hamming_distance, simhash64};
///
/// let a = simhash64("the quick brown fox jumps over the lazy dog", 5);
/// let b = simhash64("The quick brown fox jumps over the lazy dog!", 5);
/// assert_eq!(a, b);
/// assert_eq!(simhash64("", 5), 0);
/// assert!(hamming_distance(a, simhash64("completely unrelated words here", 5)) > 0);
/// ```
pub fn simhash64(text: &str, shingle_size: usize) -> u64 {
    let normalized = canonical::normalize(text);
    let words: Vec<&str> = normalized.split_whitespace().collect();
    simhash_words(&words, shingle_size, SIMHASH_SEED)
}

/// SimHash of an already-normalized word sequence.
pub fn simhash_words<S: AsRef<str>>(words: &[S], shingle_size: usize, seed: u64) -> u64 {
    simhash_from_hashes(&shingle_hashes(words, shingle_size, seed))
}

/// Bit-voting over precomputed 64-bit feature hashes.
pub fn simhash_from_hashes(hashes: &[u64]) -> u64 {
    if hashes.is_empty() {
        return 0;
    }
    let mut counters = [0i64; 64];
    for &h in hashes {
        for (bit, counter) in counters.iter_mut().enumerate() {
            if (h >> bit) & 1 == 1 {
                *counter += 1;
            } else {
                *counter -= 1;
            }
        }
    }
    let mut fingerprint = 0u64;
    for (bit, counter) in counters.iter().enumerate() {
        if *counter > 0 {
            fingerprint |= 1u64 << bit;
        }
    }
    fingerprint
}

/// Number of differing bits, in `[0, 64]`.
#[inline]
pub fn hamming_distance(a: u64, b: u64) -> u8 {
    (a ^ b).count_ones() as u8
}

/// `1 - hamming / 64`, in `[0, 1]`.
#[inline]
pub fn simhash_similarity(a: u64, b: u64) -> f64 {
    1.0 - f64::from(hamming_distance(a, b)) / 64.0
}
