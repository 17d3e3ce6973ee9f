//! Strategy seam and result types.

use chrono::NaiveDate;
use ingest::Document;
use semantic::SemanticSimilarity;
use serde::{Deserialize, Serialize};

use crate::{
    Algorithm, CancellationToken, DetectionConfig, DetectionError, GraphStrategy, LinearStrategy,
    SimilarityResult, TopicClassifier,
};

/// Everything a strategy needs besides the documents.
pub struct DetectionContext<'a> {
    pub config: &'a DetectionConfig,
    pub classifier: Option<TopicClassifier>,
    pub semantic: Option<&'a dyn SemanticSimilarity>,
    pub cancel: CancellationToken,
}

impl<'a> DetectionContext<'a> {
    /// Context with the topic classifier built from `config.topics`.
    pub fn new(config: &'a DetectionConfig) -> Self {
        Self {
            config,
            classifier: TopicClassifier::from_config(config),
            semantic: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_semantic(mut self, semantic: &'a dyn SemanticSimilarity) -> Self {
        self.semantic = Some(semantic);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// A comparison strategy.
pub trait DuplicateDetectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run over one batch. Fails with [`DetectionError::NoValidDocuments`]
    /// on empty input.
    fn detect(&self, docs: &[Document], ctx: &DetectionContext<'_>)
        -> Result<Outcome, DetectionError>;
}

/// Strategy for `algorithm`.
pub fn strategy_for(algorithm: Algorithm) -> Box<dyn DuplicateDetectionStrategy> {
    match algorithm {
        Algorithm::Linear => Box::new(LinearStrategy),
        Algorithm::Graph => Box::new(GraphStrategy),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Outcome {
    Completed(DetectionResult),
    Cancelled,
}

impl Outcome {
    pub fn completed(self) -> Option<DetectionResult> {
        match self {
            Outcome::Completed(result) => Some(result),
            Outcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

/// A document absorbed by an earlier base in a Linear run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub document: Document,
    pub base_id: String,
    pub similarity_to_base: f64,
    pub cross_topic: bool,
    pub threshold_used: f64,
    pub result: SimilarityResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub document: Document,
    pub similarity_to_base: f64,
    pub is_base: bool,
}

/// A connected component of size two or more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// 1-based, in base order.
    pub group_id: usize,
    pub base_document: Document,
    /// Base first, then the rest in `(effective_date, id)` order.
    pub members: Vec<GroupMember>,
    /// The base's classified topic, or `"unknown"`.
    pub topic: String,
}

/// Symmetric pairwise similarity matrix over the comparable documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    pub ids: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn from_rows(ids: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        Self { ids, values }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values
            .get(i)
            .and_then(|row| row.get(j))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|candidate| candidate == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum DetectionResult {
    Linear {
        kept: Vec<Document>,
        moved: Vec<MemberRecord>,
        total_comparisons: usize,
        processing_date: NaiveDate,
    },
    Graph {
        duplicate_groups: Vec<DuplicateGroup>,
        unique_documents: Vec<Document>,
        similarity_matrix: SimilarityMatrix,
        total_comparisons: usize,
    },
}

impl DetectionResult {
    pub fn total_comparisons(&self) -> usize {
        match self {
            DetectionResult::Linear {
                total_comparisons, ..
            }
            | DetectionResult::Graph {
                total_comparisons, ..
            } => *total_comparisons,
        }
    }

    /// Documents that survive the run: Linear's kept list, or Graph's
    /// uniques plus every group base.
    pub fn kept_documents(&self) -> Vec<&Document> {
        match self {
            DetectionResult::Linear { kept, .. } => kept.iter().collect(),
            DetectionResult::Graph {
                duplicate_groups,
                unique_documents,
                ..
            } => unique_documents
                .iter()
                .chain(duplicate_groups.iter().map(|g| &g.base_document))
                .collect(),
        }
    }

    /// Documents judged duplicates, each with its base id and similarity.
    pub fn duplicate_documents(&self) -> Vec<(&Document, &str, f64)> {
        match self {
            DetectionResult::Linear { moved, .. } => moved
                .iter()
                .map(|m| (&m.document, m.base_id.as_str(), m.similarity_to_base))
                .collect(),
            DetectionResult::Graph {
                duplicate_groups, ..
            } => duplicate_groups
                .iter()
                .flat_map(|g| {
                    g.members
                        .iter()
                        .filter(|m| !m.is_base)
                        .map(move |m| (&m.document, g.base_document.id.as_str(), m.similarity_to_base))
                })
                .collect(),
        }
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicate_documents().len()
    }
}

/// Indices of `docs` ordered by `(effective_date, id)`.
pub(crate) fn chronological_order(docs: &[Document]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..docs.len()).collect();
    order.sort_by(|&a, &b| {
        docs[a]
            .effective_date
            .cmp(&docs[b].effective_date)
            .then_with(|| docs[a].id.cmp(&docs[b].id))
    });
    order
}
