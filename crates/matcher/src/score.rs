//! Pairwise similarity scoring.

use ingest::Document;
use perceptual::{
    cosine_similarity, hamming_distance, jaccard_similarity, term_vector, TermVector, Vocabulary,
};
use semantic::{EmbeddingInput, SemanticSimilarity};
use serde::{Deserialize, Serialize};

use crate::{DetectionConfig, TopicClassifier};

/// Why a pair was not compared.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    BelowMinLength,
}

/// Scores for one document pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityResult {
    pub doc_a_id: String,
    pub doc_b_id: String,
    /// Jaccard over normalized title words.
    pub title_similarity: f64,
    /// TF-IDF cosine over body words.
    pub content_similarity: f64,
    pub overall_similarity: f64,
    pub hamming_distance: u8,
    pub is_duplicate: bool,
    /// Both documents classified, into different topics.
    pub cross_topic: bool,
    pub threshold_used: f64,
    /// Same `content_hash`.
    pub exact_match: bool,
    pub skipped: Option<SkipReason>,
    /// Report-only; never influences `is_duplicate`.
    pub semantic_similarity: Option<f64>,
    pub topic_a: Option<String>,
    pub topic_b: Option<String>,
}

/// Per-document inputs derived once per batch.
#[derive(Debug, Clone)]
pub struct PreparedDocument<'d> {
    pub doc: &'d Document,
    title: String,
    vector: TermVector,
    topic: Option<String>,
}

impl PreparedDocument<'_> {
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }
}

/// Scores document pairs against one batch vocabulary.
///
/// Numeric fields are symmetric: `score(a, b)` and `score(b, a)` agree bit
/// for bit.
#[derive(Clone, Copy)]
pub struct Scorer<'a> {
    config: &'a DetectionConfig,
    vocabulary: Option<&'a Vocabulary>,
    classifier: Option<&'a TopicClassifier>,
    semantic: Option<&'a dyn SemanticSimilarity>,
}

impl<'a> Scorer<'a> {
    pub fn new(config: &'a DetectionConfig) -> Self {
        Self {
            config,
            vocabulary: None,
            classifier: None,
            semantic: None,
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: &'a Vocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn with_classifier(mut self, classifier: Option<&'a TopicClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_semantic(mut self, semantic: Option<&'a dyn SemanticSimilarity>) -> Self {
        self.semantic = semantic;
        self
    }

    pub fn config(&self) -> &DetectionConfig {
        self.config
    }

    /// Whether `doc` meets the word-count floor.
    pub fn is_comparable(&self, doc: &Document) -> bool {
        doc.word_count >= self.config.min_content_length
    }

    pub fn prepare<'d>(&self, doc: &'d Document) -> PreparedDocument<'d> {
        PreparedDocument {
            doc,
            title: canonical::normalize(&doc.title),
            vector: term_vector(&doc.normalized_text, self.vocabulary),
            topic: self
                .classifier
                .and_then(|c| c.classify_document(doc))
                .map(str::to_string),
        }
    }

    /// Score two documents, preparing both on the fly.
    pub fn score(&self, a: &Document, b: &Document) -> SimilarityResult {
        self.score_prepared(&self.prepare(a), &self.prepare(b))
    }

    pub fn score_prepared(&self, a: &PreparedDocument<'_>, b: &PreparedDocument<'_>) -> SimilarityResult {
        let cfg = self.config;
        let (doc_a, doc_b) = (a.doc, b.doc);
        let cross_topic = matches!((&a.topic, &b.topic), (Some(ta), Some(tb)) if ta != tb);
        let threshold_used = if cross_topic {
            cfg.cross_topic_threshold
        } else {
            cfg.similarity_threshold
        };

        let mut result = SimilarityResult {
            doc_a_id: doc_a.id.clone(),
            doc_b_id: doc_b.id.clone(),
            title_similarity: 0.0,
            content_similarity: 0.0,
            overall_similarity: 0.0,
            hamming_distance: hamming_distance(doc_a.simhash, doc_b.simhash),
            is_duplicate: false,
            cross_topic,
            threshold_used,
            exact_match: false,
            skipped: None,
            semantic_similarity: None,
            topic_a: a.topic.clone(),
            topic_b: b.topic.clone(),
        };

        if !self.is_comparable(doc_a) || !self.is_comparable(doc_b) {
            result.skipped = Some(SkipReason::BelowMinLength);
            return result;
        }

        if doc_a.content_hash == doc_b.content_hash {
            result.title_similarity = 1.0;
            result.content_similarity = 1.0;
            result.overall_similarity = 1.0;
            result.exact_match = true;
        } else {
            result.title_similarity = if a.title == b.title && !a.title.is_empty() {
                1.0
            } else {
                jaccard_similarity(&a.title, &b.title)
            };
            result.content_similarity = cosine_similarity(&a.vector, &b.vector);
            result.overall_similarity = (cfg.title_weight * result.title_similarity
                + cfg.content_weight * result.content_similarity)
                .min(1.0);
        }
        result.is_duplicate = result.overall_similarity >= threshold_used;

        if let Some(semantic) = self.semantic {
            result.semantic_similarity = semantic.similarity(
                &EmbeddingInput {
                    content_hash: &doc_a.content_hash,
                    text: &doc_a.content_text,
                },
                &EmbeddingInput {
                    content_hash: &doc_b.content_hash,
                    text: &doc_b.content_text,
                },
            );
        }
        result
    }
}

/// Vocabulary over the documents that meet the length floor.
pub fn batch_vocabulary<'d, I>(docs: I, min_content_length: usize) -> Vocabulary
where
    I: IntoIterator<Item = &'d Document>,
{
    Vocabulary::from_texts(
        docs.into_iter()
            .filter(|d| d.word_count >= min_content_length)
            .map(|d| d.normalized_text.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::doc;

    fn cfg() -> DetectionConfig {
        DetectionConfig::default().with_min_content_length(3)
    }

    #[test]
    fn identical_content_is_exact_match() {
        let cfg = cfg();
        let a = doc("a.md", "Plug Guide", "smart plugs save power at home", "2024-01-01");
        let mut b = a.clone();
        b.id = "b.md".into();
        b.title = "Totally different".into();
        let r = Scorer::new(&cfg).score(&a, &b);
        assert!(r.exact_match);
        assert_eq!(r.overall_similarity, 1.0);
        assert_eq!(r.title_similarity, 1.0);
        assert!(r.is_duplicate);
        assert_eq!(r.hamming_distance, 0);
    }

    #[test]
    fn short_documents_are_skipped() {
        let cfg = DetectionConfig::default().with_min_content_length(50);
        let a = doc("a.md", "Plug", "smart plugs", "2024-01-01");
        let b = doc("b.md", "Plug", "smart plugs", "2024-01-02");
        let r = Scorer::new(&cfg).score(&a, &b);
        assert_eq!(r.skipped, Some(SkipReason::BelowMinLength));
        assert_eq!(r.overall_similarity, 0.0);
        assert!(!r.is_duplicate);
        assert!(!r.exact_match);
    }

    #[test]
    fn unrelated_documents_score_low() {
        let cfg = cfg();
        let a = doc("a.md", "Smart plugs", "smart plugs save power at home", "2024-01-01");
        let b = doc("b.md", "Sourdough", "baking bread needs a lively starter", "2024-01-02");
        let vocab = batch_vocabulary([&a, &b], cfg.min_content_length);
        let r = Scorer::new(&cfg).with_vocabulary(&vocab).score(&a, &b);
        assert_eq!(r.title_similarity, 0.0);
        assert_eq!(r.content_similarity, 0.0);
        assert!(!r.is_duplicate);
        assert!(r.skipped.is_none());
    }

    #[test]
    fn scores_are_symmetric() {
        let cfg = cfg();
        let a = doc(
            "a.md",
            "Best smart plugs",
            "smart plugs with energy monitoring and schedules for lamps",
            "2024-01-01",
        );
        let b = doc(
            "b.md",
            "Smart plugs reviewed",
            "energy monitoring smart plugs and timers for lamps and fans",
            "2024-01-02",
        );
        let vocab = batch_vocabulary([&a, &b], cfg.min_content_length);
        let scorer = Scorer::new(&cfg).with_vocabulary(&vocab);
        let ab = scorer.score(&a, &b);
        let ba = scorer.score(&b, &a);
        assert_eq!(ab.overall_similarity.to_bits(), ba.overall_similarity.to_bits());
        assert_eq!(ab.title_similarity.to_bits(), ba.title_similarity.to_bits());
        assert_eq!(ab.content_similarity.to_bits(), ba.content_similarity.to_bits());
        assert_eq!(ab.hamming_distance, ba.hamming_distance);
        assert!(ab.overall_similarity > 0.0 && ab.overall_similarity <= 1.0);
    }

    #[test]
    fn cross_topic_pairs_use_stricter_threshold() {
        let cfg = cfg()
            .with_topic("plugs", ["plug"])
            .with_topic("bread", ["bread"]);
        let classifier = TopicClassifier::from_config(&cfg);
        let a = doc("a.md", "Plug", "plug words here today", "2024-01-01");
        let b = doc("b.md", "Bread", "bread words here today", "2024-01-02");
        let c = doc("c.md", "Plug again", "plug words there today", "2024-01-03");
        let scorer = Scorer::new(&cfg).with_classifier(classifier.as_ref());

        let cross = scorer.score(&a, &b);
        assert!(cross.cross_topic);
        assert_eq!(cross.threshold_used, 0.85);
        assert_eq!(cross.topic_a.as_deref(), Some("plugs"));
        assert_eq!(cross.topic_b.as_deref(), Some("bread"));

        let same = scorer.score(&a, &c);
        assert!(!same.cross_topic);
        assert_eq!(same.threshold_used, 0.7);
    }

    #[test]
    fn unclassified_side_is_not_cross_topic() {
        let cfg = cfg().with_topic("plugs", ["plug"]);
        let classifier = TopicClassifier::from_config(&cfg);
        let a = doc("a.md", "Plug", "plug words here", "2024-01-01");
        let b = doc("b.md", "Bread", "bread words here", "2024-01-02");
        let r = Scorer::new(&cfg)
            .with_classifier(classifier.as_ref())
            .score(&a, &b);
        assert!(!r.cross_topic);
        assert_eq!(r.topic_b, None);
        assert_eq!(r.threshold_used, cfg.similarity_threshold);
    }

    struct Fixed(Option<f64>);

    impl SemanticSimilarity for Fixed {
        fn similarity(&self, _: &EmbeddingInput<'_>, _: &EmbeddingInput<'_>) -> Option<f64> {
            self.0
        }
    }

    #[test]
    fn semantic_score_is_report_only() {
        let cfg = cfg();
        let a = doc("a.md", "Plug", "smart plugs save power", "2024-01-01");
        let b = doc("b.md", "Bread", "baking bread needs starter", "2024-01-02");
        let high = Fixed(Some(0.99));
        let r = Scorer::new(&cfg)
            .with_semantic(Some(&high as &dyn SemanticSimilarity))
            .score(&a, &b);
        assert_eq!(r.semantic_similarity, Some(0.99));
        assert!(!r.is_duplicate);

        let failing = Fixed(None);
        let r = Scorer::new(&cfg)
            .with_semantic(Some(&failing as &dyn SemanticSimilarity))
            .score(&a, &b);
        assert_eq!(r.semantic_similarity, None);
    }

    #[test]
    fn vocabulary_ignores_short_documents() {
        let a = doc("a.md", "A", "one two three four", "2024-01-01");
        let b = doc("b.md", "B", "one", "2024-01-01");
        let vocab = batch_vocabulary([&a, &b], 3);
        assert_eq!(vocab.document_count(), 1);
    }
}
