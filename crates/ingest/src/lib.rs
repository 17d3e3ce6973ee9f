//! dupgate document analyzer
//!
//! This is where articles enter the pipeline. We read a markdown file (or raw
//! text), pull what we need out of its front matter, strip the noise, and
//! produce an immutable [`Document`] that the scorer and strategies consume.
//!
//! ## What we do here
//!
//! - **Front matter** - a leading `---` YAML block gives the title, the
//!   declared date and the topic hint. Broken YAML is logged and ignored.
//! - **Titles** - front-matter `title`, else the first `# ` heading, else the
//!   file stem title-cased.
//! - **Noise stripping** - images, tables, code fences and HTML comments go;
//!   inline markdown is reduced to its text. The result is `content_text`.
//! - **Dates** - declared date, then a date in the file name, then the
//!   filesystem creation and modification times, then now.
//! - **Fingerprints** - SHA-256 of the normalized prose and a word-shingle
//!   SimHash. The SimHash comes from a [`SimHasher`], so a caller holding a
//!   fingerprint cache can answer from it before anything is computed.
//!
//! Only unreadable input is an error. [`scan_directory`] collects per-file
//! failures instead of aborting.
//!
//! ## Example
//!
//! ```
//! use ingest::{analyze, AnalyzerConfig, DateSource, DocumentSource};
//!
//! let text = "---\ntitle: Smart Plug Guide\ndate: 2024-05-01\n---\n\
//!             Smart plugs switch lamps on a schedule.";
//! let doc = analyze(DocumentSource::text("guide", text), &AnalyzerConfig::default()).unwrap();
//!
//! assert_eq!(doc.title, "Smart Plug Guide");
//! assert_eq!(doc.date_source, DateSource::Declared);
//! assert_eq!(doc.word_count, 7);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn, Level};
use uuid::Uuid;
use walkdir::WalkDir;

mod config;
mod dates;
mod error;
mod metadata;
mod types;

use crate::metadata::{resolve_title, FrontMatter};

pub use crate::config::AnalyzerConfig;
pub use crate::dates::{date_from_file_name, parse_declared_date};
pub use crate::error::AnalysisError;
pub use crate::types::{DateSource, Document, DocumentFailure, DocumentSource, ScanReport};

/// Supplies a document's SimHash once its content hash is known.
pub trait SimHasher {
    /// SimHash of `content_text`, whose normalized form hashes to
    /// `content_hash`.
    fn simhash(&self, content_hash: &str, source: Option<&Path>, content_text: &str) -> u64;
}

/// Computes every SimHash with [`perceptual::simhash64`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectSimHasher {
    pub shingle_size: usize,
}

impl DirectSimHasher {
    pub fn new(shingle_size: usize) -> Self {
        Self { shingle_size }
    }
}

impl SimHasher for DirectSimHasher {
    fn simhash(&self, _content_hash: &str, _source: Option<&Path>, content_text: &str) -> u64 {
        perceptual::simhash64(content_text, self.shingle_size)
    }
}

/// Analyze one document, computing its SimHash directly.
///
/// # Errors
///
/// [`AnalysisError::Io`] or [`AnalysisError::InvalidUtf8`] when a file cannot
/// be read as text, and [`AnalysisError::InvalidConfig`] when `cfg` fails
/// validation.
pub fn analyze(source: DocumentSource, cfg: &AnalyzerConfig) -> Result<Document, AnalysisError> {
    analyze_with(source, cfg, &DirectSimHasher::new(cfg.shingle_size))
}

/// Analyze one document, taking its SimHash from `hasher`.
///
/// # Errors
///
/// The same as [`analyze`].
pub fn analyze_with(
    source: DocumentSource,
    cfg: &AnalyzerConfig,
    hasher: &dyn SimHasher,
) -> Result<Document, AnalysisError> {
    cfg.validate()?;
    let start = Instant::now();
    let label = match &source {
        DocumentSource::Path(path) => path.display().to_string(),
        DocumentSource::Text { id, .. } => id.clone().unwrap_or_else(|| "<text>".to_string()),
    };
    let span = tracing::span!(Level::DEBUG, "ingest.analyze", source = %label);
    let _guard = span.enter();

    let result = match source {
        DocumentSource::Path(path) => analyze_path(path, cfg, hasher),
        DocumentSource::Text { id, text } => Ok(analyze_text(id, text, cfg, hasher)),
    };

    let elapsed_micros = start.elapsed().as_micros();
    match &result {
        Ok(doc) => debug!(
            id = %doc.id,
            word_count = doc.word_count,
            date_source = ?doc.date_source,
            elapsed_micros,
            "analyze_success"
        ),
        Err(err) => warn!(error = %err, elapsed_micros, "analyze_failure"),
    }
    result
}

fn analyze_path(
    path: PathBuf,
    cfg: &AnalyzerConfig,
    hasher: &dyn SimHasher,
) -> Result<Document, AnalysisError> {
    let display = path.display().to_string();
    let bytes = fs::read(&path).map_err(|err| AnalysisError::Io {
        path: display.clone(),
        message: err.to_string(),
    })?;
    let raw_text =
        String::from_utf8(bytes).map_err(|_| AnalysisError::InvalidUtf8 { path: display.clone() })?;
    let fs_meta = fs::metadata(&path).ok();

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| display.clone());
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());

    Ok(build_document(
        DocumentInput {
            id: Some(display),
            path: Some(path),
            file_name,
            stem,
            raw_text,
        },
        fs_meta.as_ref(),
        cfg,
        hasher,
    ))
}

fn analyze_text(
    id: Option<String>,
    text: String,
    cfg: &AnalyzerConfig,
    hasher: &dyn SimHasher,
) -> Document {
    let id = id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty());
    let name = id.clone().unwrap_or_default();
    build_document(
        DocumentInput {
            id,
            path: None,
            file_name: name.clone(),
            stem: name,
            raw_text: text,
        },
        None,
        cfg,
        hasher,
    )
}

struct DocumentInput {
    id: Option<String>,
    path: Option<PathBuf>,
    file_name: String,
    stem: String,
    raw_text: String,
}

fn build_document(
    input: DocumentInput,
    fs_meta: Option<&fs::Metadata>,
    cfg: &AnalyzerConfig,
    hasher: &dyn SimHasher,
) -> Document {
    let (front_block, body) = canonical::split_front_matter(&input.raw_text);
    let front = FrontMatter::parse(front_block, &input.file_name);

    let content_text = canonical::strip_markdown(body);
    let normalized_text = canonical::normalize(&content_text);
    let word_count = content_text.split_whitespace().count();
    let content_hash = canonical::hash_text(&normalized_text);
    let simhash = hasher.simhash(&content_hash, input.path.as_deref(), &content_text);

    let id = input.id.unwrap_or_else(|| {
        Uuid::new_v5(&cfg.doc_id_namespace, content_hash.as_bytes()).to_string()
    });
    let stem = if input.stem.is_empty() { id.as_str() } else { input.stem.as_str() };
    let title = resolve_title(&front, body, stem);
    let (effective_date, date_source) =
        dates::resolve_effective_date(front.date.as_deref(), &input.file_name, fs_meta);

    Document {
        file_name: if input.file_name.is_empty() { id.clone() } else { input.file_name },
        id,
        path: input.path,
        title,
        content_text,
        normalized_text,
        word_count,
        content_hash,
        simhash,
        effective_date,
        date_source,
        topic_hint: front.topic,
        raw_text: input.raw_text,
    }
}

/// Analyze every matching file in `dir`.
///
/// Files are visited in file-name order. Per-file failures land in
/// [`ScanReport::failures`]; only an unusable root is an error.
///
/// # Errors
///
/// [`AnalysisError::DirectoryNotFound`] when `dir` is missing, not a
/// directory, or unreadable; [`AnalysisError::InvalidConfig`] for a bad
/// `cfg`.
pub fn scan_directory(dir: &Path, cfg: &AnalyzerConfig) -> Result<ScanReport, AnalysisError> {
    scan_directory_with(dir, cfg, &DirectSimHasher::new(cfg.shingle_size))
}

/// [`scan_directory`] with SimHashes taken from `hasher`.
pub fn scan_directory_with(
    dir: &Path,
    cfg: &AnalyzerConfig,
    hasher: &dyn SimHasher,
) -> Result<ScanReport, AnalysisError> {
    cfg.validate()?;
    let start = Instant::now();
    let not_found = || AnalysisError::DirectoryNotFound {
        path: dir.display().to_string(),
    };
    if !dir.is_dir() {
        return Err(not_found());
    }
    fs::read_dir(dir).map_err(|_| not_found())?;

    let max_depth = if cfg.recursive { usize::MAX } else { 1 };
    let mut report = ScanReport::default();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                warn!(path = %path.display(), error = %err, "scan_entry_failure");
                report.failures.push(DocumentFailure {
                    path,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() || !cfg.accepts(entry.path()) {
            continue;
        }
        match analyze_with(DocumentSource::Path(entry.path().to_path_buf()), cfg, hasher) {
            Ok(doc) => report.documents.push(doc),
            Err(err) => report.failures.push(DocumentFailure {
                path: entry.path().to_path_buf(),
                reason: err.to_string(),
            }),
        }
    }

    info!(
        dir = %dir.display(),
        documents = report.documents.len(),
        failures = report.failures.len(),
        elapsed_micros = start.elapsed().as_micros(),
        "scan_complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use super::*;

    const ARTICLE: &str = "---\n\
title: Choosing a Smart Plug\n\
date: 2024-02-10\n\
category: smart-home\n\
---\n\
# Ignored Heading\n\
\n\
Smart plugs let you **schedule** lamps.\n\
\n\
![diagram](plug.png)\n\
\n\
| model | price |\n\
|-------|-------|\n\
| a     | 10    |\n\
\n\
```bash\n\
echo configure\n\
```\n\
<!-- editor note -->\n\
See [the manual](https://example.com) for details.\n";

    fn cfg() -> AnalyzerConfig {
        AnalyzerConfig::default()
    }

    #[test]
    fn analyze_text_extracts_metadata() {
        let doc = analyze(DocumentSource::text("plug", ARTICLE), &cfg()).unwrap();
        assert_eq!(doc.id, "plug");
        assert_eq!(doc.title, "Choosing a Smart Plug");
        assert_eq!(doc.topic_hint.as_deref(), Some("smart-home"));
        assert_eq!(doc.date_source, DateSource::Declared);
        assert_eq!(
            doc.effective_date,
            Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn noise_is_stripped_before_counting() {
        let doc = analyze(DocumentSource::text("plug", ARTICLE), &cfg()).unwrap();
        assert!(!doc.content_text.contains("echo"));
        assert!(!doc.content_text.contains("editor note"));
        assert!(!doc.content_text.contains("price"));
        assert!(!doc.content_text.contains("plug.png"));
        assert!(doc.content_text.contains("the manual"));
        assert_eq!(doc.word_count, doc.content_text.split_whitespace().count());
    }

    #[test]
    fn content_hash_is_sha256_of_normalized_text() {
        let doc = analyze(DocumentSource::text("plug", ARTICLE), &cfg()).unwrap();
        assert_eq!(doc.content_hash, canonical::hash_text(&doc.normalized_text));
        assert_eq!(doc.content_hash.len(), 64);
        assert_eq!(doc.simhash, perceptual::simhash64(&doc.content_text, 5));
    }

    #[test]
    fn simhash_comes_from_the_supplied_hasher() {
        use std::cell::RefCell;

        struct Recording(RefCell<Vec<(String, Option<PathBuf>)>>);
        impl SimHasher for Recording {
            fn simhash(&self, content_hash: &str, source: Option<&Path>, _text: &str) -> u64 {
                self.0
                    .borrow_mut()
                    .push((content_hash.to_string(), source.map(Path::to_path_buf)));
                0xABCD
            }
        }

        let dir = tempdir().unwrap();
        let path = dir.path().join("plug.md");
        fs::write(&path, ARTICLE).unwrap();
        let hasher = Recording(RefCell::new(Vec::new()));

        let doc = analyze_with(DocumentSource::path(&path), &cfg(), &hasher).unwrap();
        assert_eq!(doc.simhash, 0xABCD);
        let calls = hasher.0.into_inner();
        assert_eq!(calls, vec![(doc.content_hash.clone(), Some(path))]);
    }

    #[test]
    fn anonymous_text_gets_deterministic_uuid() {
        let a = analyze(DocumentSource::anonymous_text("same words here"), &cfg()).unwrap();
        let b = analyze(DocumentSource::anonymous_text("same words here"), &cfg()).unwrap();
        let c = analyze(DocumentSource::anonymous_text("other words"), &cfg()).unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert_eq!(a.date_source, DateSource::Now);
    }

    #[test]
    fn malformed_front_matter_is_not_an_error() {
        let text = "---\ntitle: [broken\n---\nbody words";
        let doc = analyze(DocumentSource::text("my-post", text), &cfg()).unwrap();
        assert_eq!(doc.title, "My Post");
        assert_eq!(doc.topic_hint, None);
    }

    #[test]
    fn empty_text_yields_zero_signal() {
        let doc = analyze(DocumentSource::text("empty", ""), &cfg()).unwrap();
        assert_eq!(doc.word_count, 0);
        assert_eq!(doc.simhash, 0);
    }

    #[test]
    fn file_name_date_beats_filesystem_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("2023-07-04-grills.md");
        fs::write(&path, "Grilling tips for summer.").unwrap();
        let doc = analyze(DocumentSource::path(&path), &cfg()).unwrap();
        assert_eq!(doc.date_source, DateSource::Filename);
        assert_eq!(doc.file_name, "2023-07-04-grills.md");
        assert_eq!(doc.title, "2023 07 04 Grills");
        assert_eq!(doc.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = analyze(DocumentSource::path(dir.path().join("nope.md")), &cfg()).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn non_utf8_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bin.md");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let err = analyze(DocumentSource::path(&path), &cfg()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidUtf8 { .. }));
    }

    #[test]
    fn scan_collects_documents_and_failures() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "second article body").unwrap();
        fs::write(dir.path().join("a.md"), "first article body").unwrap();
        fs::write(dir.path().join("c.md"), [0xffu8, 0xfe]).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("d.md"), "nested body").unwrap();

        let report = scan_directory(dir.path(), &cfg()).unwrap();
        let names: Vec<_> = report.documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("c.md"));

        let recursive = scan_directory(dir.path(), &cfg().with_recursive(true)).unwrap();
        assert_eq!(recursive.documents.len(), 3);
    }

    #[test]
    fn scan_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let err = scan_directory(&dir.path().join("absent"), &cfg()).unwrap_err();
        assert!(matches!(err, AnalysisError::DirectoryNotFound { .. }));
    }
}
