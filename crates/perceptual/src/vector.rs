//! Term vectors, corpus vocabulary and set/vector similarity.
//!
//! All maps are ordered (`BTreeMap`/`BTreeSet`) so floating-point sums are
//! accumulated in the same order on every run and for either argument order.
//! That keeps `cosine_similarity(a, b) == cosine_similarity(b, a)` bit for bit.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Document frequencies for one comparison batch.
///
/// IDF is smoothed so every weight stays strictly positive, including for
/// terms that appear in every document or in none:
///
/// ```text
/// idf(t) = ln((1 + N) / (1 + df(t))) + 1
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Vocabulary {
    document_frequency: BTreeMap<String, usize>,
    documents: usize,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from normalized texts (one per document).
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocab = Self::new();
        for text in texts {
            vocab.add_document(text.as_ref());
        }
        vocab
    }

    /// Count each distinct word of `normalized_text` once.
    pub fn add_document(&mut self, normalized_text: &str) {
        let distinct: BTreeSet<&str> = normalized_text.split_whitespace().collect();
        for term in distinct {
            *self.document_frequency.entry(term.to_string()).or_insert(0) += 1;
        }
        self.documents += 1;
    }

    pub fn document_count(&self) -> usize {
        self.documents
    }

    pub fn term_count(&self) -> usize {
        self.document_frequency.len()
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    pub fn idf(&self, term: &str) -> f64 {
        let n = self.documents as f64;
        let df = self.document_frequency(term) as f64;
        ((1.0 + n) / (1.0 + df)).ln() + 1.0
    }
}

/// Sparse `term -> weight` map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TermVector {
    weights: BTreeMap<String, f64>,
}

impl TermVector {
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn magnitude(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum::<f64>().sqrt()
    }
}

impl FromIterator<(String, f64)> for TermVector {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}

/// Weight the words of `normalized_text`.
///
/// With a vocabulary the weight is `tf * idf` where `tf` is the term count
/// over the document length; without one it is the raw term count.
///
/// ```rust
/// use perceptual::{term_vector, Vocabulary};
///
/// let raw = term_vector("plug plug lamp", None);
/// assert_eq!(raw.weight("plug"), 2.0);
///
/// let vocab = Vocabulary::from_texts(["plug lamp", "plug fan"]);
/// let weighted = term_vector("plug lamp", Some(&vocab));
/// assert!(weighted.weight("lamp") > weighted.weight("plug"));
/// ```
pub fn term_vector(normalized_text: &str, vocabulary: Option<&Vocabulary>) -> TermVector {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut total = 0usize;
    for word in normalized_text.split_whitespace() {
        *counts.entry(word).or_insert(0) += 1;
        total += 1;
    }

    match vocabulary {
        None => counts
            .into_iter()
            .map(|(term, count)| (term.to_string(), count as f64))
            .collect(),
        Some(vocab) => counts
            .into_iter()
            .map(|(term, count)| {
                let tf = count as f64 / total as f64;
                (term.to_string(), tf * vocab.idf(term))
            })
            .collect(),
    }
}

/// Dot product over norms, clamped to `[0, 1]`.
///
/// Returns `0.0` when either vector has zero magnitude or the vectors share
/// no terms.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let norm_a = a.magnitude();
    let norm_b = b.magnitude();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // Merge-join in key order so the summation order is argument-independent.
    let mut dot = 0.0;
    let mut left = a.weights.iter().peekable();
    let mut right = b.weights.iter().peekable();
    while let (Some((ka, wa)), Some((kb, wb))) = (left.peek(), right.peek()) {
        match ka.cmp(kb) {
            std::cmp::Ordering::Less => {
                left.next();
            }
            std::cmp::Ordering::Greater => {
                right.next();
            }
            std::cmp::Ordering::Equal => {
                dot += *wa * *wb;
                left.next();
                right.next();
            }
        }
    }

    let denom = if norm_a <= norm_b {
        norm_a * norm_b
    } else {
        norm_b * norm_a
    };
    (dot / denom).clamp(0.0, 1.0)
}

/// `|A ∩ B| / |A ∪ B|` over distinct whitespace-separated words.
///
/// Identical word sets score `1.0`; two empty inputs score `0.0`.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}
