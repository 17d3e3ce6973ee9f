//! Workspace umbrella crate for dupgate.
//!
//! This crate stitches the analyzer, the fingerprint store, the matcher and
//! the keyword layer together behind [`DedupEngine`], so a caller can go from
//! a directory of articles to grouped duplicates with one call. The `dupgate`
//! binary is a thin clap front end over the same API.
//!
//! ```no_run
//! use dupgate::{DedupEngine, DupgateConfig, RunOutcome};
//!
//! let engine = DedupEngine::new(DupgateConfig::default())?;
//! if let RunOutcome::Completed(report) = engine.run("articles".as_ref())? {
//!     println!("{} duplicate(s)", report.result.duplicate_count());
//! }
//! # Ok::<(), dupgate::DedupError>(())
//! ```

pub mod config;
mod processor;

pub use crate::config::{ConfigLoadError, DupgateConfig, ProcessorConfig, StoreSection};
pub use crate::processor::{MoveKind, PlannedMove, ProcessSummary, ResultProcessor};

pub use index::{CacheStats, FingerprintStore, StoreConfig, StoreError};
pub use ingest::{AnalysisError, AnalyzerConfig, Document, DocumentFailure, ScanReport};
pub use keyword::{
    suggest_angles, AngleSuggestion, DeduplicationResult, KeywordConfig, KeywordDeduplicator,
    KeywordError,
};
pub use matcher::{
    Algorithm, CancellationToken, DetectionConfig, DetectionError, DetectionResult, Outcome,
    SimilarityResult, SimilarityStats,
};
pub use semantic::{SemanticConfig, SemanticError};

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use ingest::{DocumentSource, SimHasher};
use matcher::{batch_vocabulary, strategy_for, DetectionContext, Scorer, TopicClassifier};
use semantic::{CachedEmbedder, HashingEmbedder, SemanticSimilarity};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, Level};

/// Exit code for an unreadable directory or a run with nothing to compare.
pub const EXIT_NO_INPUT: i32 = 2;
/// Exit code for configuration errors.
pub const EXIT_CONFIG: i32 = 3;
/// Exit code for a cancelled run.
pub const EXIT_CANCELLED: i32 = 130;

/// Errors that can occur while running the engine.
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("analysis failure: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("detection failure: {0}")]
    Detection(#[from] DetectionError),

    #[error("fingerprint store failure: {0}")]
    Store(#[from] StoreError),

    #[error("semantic signal failure: {0}")]
    Semantic(#[from] SemanticError),

    #[error("keyword layer failure: {0}")]
    Keyword(#[from] KeywordError),
}

impl DedupError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            DedupError::Config(_)
            | DedupError::Detection(DetectionError::InvalidConfig(_))
            | DedupError::Analysis(AnalysisError::InvalidConfig(_))
            | DedupError::Semantic(SemanticError::InvalidConfig(_))
            | DedupError::Keyword(KeywordError::InvalidConfig(_)) => EXIT_CONFIG,
            DedupError::Detection(DetectionError::NoValidDocuments)
            | DedupError::Analysis(AnalysisError::DirectoryNotFound { .. }) => EXIT_NO_INPUT,
            _ => 1,
        }
    }
}

/// Everything a completed directory run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub directory: PathBuf,
    pub algorithm: Algorithm,
    pub documents_analyzed: usize,
    pub result: DetectionResult,
    /// Files that could not be analyzed.
    pub failures: Vec<DocumentFailure>,
    /// Graph: every in-window pair. Linear: the duplicates found.
    pub stats: SimilarityStats,
    /// Fingerprint cache lookups made by this run.
    pub cache: CacheStats,
    /// Cache entries dropped by the end-of-run eviction.
    pub evicted: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed(RunReport),
    Cancelled,
}

/// Runs directories and file pairs through the whole pipeline.
pub struct DedupEngine {
    config: DupgateConfig,
    store: Arc<FingerprintStore>,
    semantic: Option<CachedEmbedder<HashingEmbedder>>,
    cancel: CancellationToken,
}

impl DedupEngine {
    /// Validate `config` and open the fingerprint store it names.
    pub fn new(config: DupgateConfig) -> Result<Self, DedupError> {
        config.validate()?;
        let store = Arc::new(
            FingerprintStore::from_config(&config.store_config())
                .with_shingle_size(config.analyzer.shingle_size),
        );
        let semantic = if config.semantic.enabled {
            let embedder = HashingEmbedder::new(&config.semantic)?;
            Some(CachedEmbedder::new(embedder, Arc::clone(&store)))
        } else {
            None
        };
        Ok(Self {
            config,
            store,
            semantic,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that cancels runs of this engine.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &DupgateConfig {
        &self.config
    }

    pub fn store(&self) -> &FingerprintStore {
        &self.store
    }

    /// Scan `dir`, resolving every document's SimHash through the cache.
    pub fn analyze_directory(&self, dir: &Path) -> Result<ScanReport, DedupError> {
        Ok(ingest::scan_directory_with(
            dir,
            &self.config.analyzer,
            &self.cached_simhash(),
        )?)
    }

    /// Run the configured strategy over already-analyzed documents.
    pub fn detect(&self, docs: &[Document]) -> Result<Outcome, DedupError> {
        let mut ctx = DetectionContext::new(&self.config.detection)
            .with_cancellation(self.cancel.clone());
        if let Some(semantic) = self.semantic_signal() {
            ctx = ctx.with_semantic(semantic);
        }
        let strategy = strategy_for(self.config.detection.algorithm);
        Ok(strategy.detect(docs, &ctx)?)
    }

    /// Scan, detect, evict and flush.
    ///
    /// # Errors
    ///
    /// Fails when `dir` is unusable, when it holds no analyzable document, or
    /// when the cache cannot be persisted.
    pub fn run(&self, dir: &Path) -> Result<RunOutcome, DedupError> {
        let span = tracing::span!(Level::INFO, "dupgate.run", dir = %dir.display());
        let _guard = span.enter();
        let start = Instant::now();
        let lookups_before = self.store.cache_stats();

        let scan = self.analyze_directory(dir)?;
        let cache = self.store.cache_stats().since(&lookups_before);
        let result = match self.detect(&scan.documents)? {
            Outcome::Completed(result) => result,
            Outcome::Cancelled => {
                info!(elapsed_ms = start.elapsed().as_millis(), "run_cancelled");
                return Ok(RunOutcome::Cancelled);
            }
        };

        let stats = match &result {
            DetectionResult::Graph {
                similarity_matrix, ..
            } => SimilarityStats::from_matrix(similarity_matrix),
            DetectionResult::Linear { moved, .. } => {
                SimilarityStats::from_scores(moved.iter().map(|m| m.similarity_to_base).collect())
            }
        };
        let evicted = self.store.evict(self.config.retention());
        self.store.flush()?;

        info!(
            documents = scan.documents.len(),
            failures = scan.failures.len(),
            duplicates = result.duplicate_count(),
            comparisons = result.total_comparisons(),
            cache_hits = cache.hits,
            cache_misses = cache.misses,
            evicted,
            elapsed_ms = start.elapsed().as_millis(),
            "run_complete"
        );
        Ok(RunOutcome::Completed(RunReport {
            directory: dir.to_path_buf(),
            algorithm: self.config.detection.algorithm,
            documents_analyzed: scan.documents.len(),
            result,
            failures: scan.failures,
            stats,
            cache,
            evicted,
        }))
    }

    /// Score two files against each other, ignoring the comparison window.
    pub fn compare(&self, file_a: &Path, file_b: &Path) -> Result<SimilarityResult, DedupError> {
        let hasher = self.cached_simhash();
        let a = ingest::analyze_with(DocumentSource::path(file_a), &self.config.analyzer, &hasher)?;
        let b = ingest::analyze_with(DocumentSource::path(file_b), &self.config.analyzer, &hasher)?;

        let detection = &self.config.detection;
        let vocabulary = batch_vocabulary([&a, &b], detection.min_content_length);
        let classifier = TopicClassifier::from_config(detection);
        let result = Scorer::new(detection)
            .with_vocabulary(&vocabulary)
            .with_classifier(classifier.as_ref())
            .with_semantic(self.semantic_signal())
            .score(&a, &b);
        self.store.flush()?;
        Ok(result)
    }

    /// Move (or plan moving) the documents of `result` into dated folders.
    pub fn process_results(&self, result: &DetectionResult, dry_run: bool) -> ProcessSummary {
        ResultProcessor::new(self.config.processor.clone()).process(result, dry_run)
    }

    /// Keyword deduplicator persisting under `state_dir`, using the
    /// `keyword` section of the config.
    pub fn keyword_deduplicator(&self, state_dir: &Path) -> Result<KeywordDeduplicator, DedupError> {
        Ok(KeywordDeduplicator::open(state_dir, self.config.keyword.clone())?)
    }

    fn semantic_signal(&self) -> Option<&dyn SemanticSimilarity> {
        self.semantic.as_ref().map(|s| s as &dyn SemanticSimilarity)
    }

    fn cached_simhash(&self) -> StoreSimHasher<'_> {
        StoreSimHasher {
            store: &self.store,
            shingle_size: self.config.analyzer.shingle_size,
        }
    }
}

/// Answers SimHash lookups from the fingerprint store, computing only on a
/// miss.
struct StoreSimHasher<'a> {
    store: &'a FingerprintStore,
    shingle_size: usize,
}

impl SimHasher for StoreSimHasher<'_> {
    fn simhash(&self, content_hash: &str, source: Option<&Path>, content_text: &str) -> u64 {
        let source = source.map(|path| path.display().to_string());
        self.store
            .get_or_compute(content_hash, source.as_deref(), || {
                Ok::<_, Infallible>(perceptual::simhash64(content_text, self.shingle_size))
            })
            .unwrap_or_else(|never| match never {})
            .simhash
    }
}
