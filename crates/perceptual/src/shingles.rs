//! Word shingling.
//!
//! Shingles are hashed straight away; only their 64-bit digests flow into
//! SimHash. Each digest is `xxh3(shingle_text, key)` where the shingle text is
//! the window's words joined by a single space, so hashing is independent of
//! how the caller split words.

use xxhash_rust::xxh3::xxh3_64_with_seed;

/// SplitMix64 finalizer, used to derive the shingle hash key from the seed.
#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Hash overlapping `k`-word windows in order.
///
/// With fewer than `k` words every word becomes its own shingle. An empty
/// word list yields no shingles.
pub fn shingle_hashes<S: AsRef<str>>(words: &[S], k: usize, seed: u64) -> Vec<u64> {
    let key = splitmix64(seed);
    if words.is_empty() {
        return Vec::new();
    }
    if k <= 1 || words.len() < k {
        return words
            .iter()
            .map(|w| xxh3_64_with_seed(w.as_ref().as_bytes(), key))
            .collect();
    }

    let mut out = Vec::with_capacity(words.len() - k + 1);
    let mut buf = String::new();
    for window in words.windows(k) {
        buf.clear();
        for (idx, word) in window.iter().enumerate() {
            if idx > 0 {
                buf.push(' ');
            }
            buf.push_str(word.as_ref());
        }
        out.push(xxh3_64_with_seed(buf.as_bytes(), key));
    }
    out
}
