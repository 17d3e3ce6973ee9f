//! Moves analyzed articles into dated folders after a run.
//!
//! Kept documents go to `{new_folder}/{YYYY-MM-DD}/` and duplicates to
//! `{old_folder}/{YYYY-MM-DD}/`. A name already taken in the target folder
//! gets an `_HHMMSS` suffix on its stem. Documents that did not come from a
//! file are skipped.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use ingest::{Document, DocumentFailure};
use matcher::DetectionResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ProcessorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Kept,
    Duplicate,
}

/// One file move, planned or performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub document_id: String,
    pub from: PathBuf,
    pub to: PathBuf,
    pub kind: MoveKind,
    /// Base document of a duplicate.
    pub base_id: Option<String>,
    pub similarity_to_base: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub kept_count: usize,
    pub moved_count: usize,
    /// Dated folder that received the kept documents.
    pub new_folder: PathBuf,
    /// Dated folder that received the duplicates.
    pub old_folder: PathBuf,
    pub processing_date: NaiveDate,
    pub dry_run: bool,
    pub planned: Vec<PlannedMove>,
    /// Moves that failed; the rest of the run still went ahead.
    pub failures: Vec<DocumentFailure>,
}

pub struct ResultProcessor {
    config: ProcessorConfig,
}

impl ResultProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn process(&self, result: &DetectionResult, dry_run: bool) -> ProcessSummary {
        self.process_at(result, dry_run, Utc::now())
    }

    /// Plan every move for `result` and, unless `dry_run`, perform them.
    ///
    /// The dated folder comes from a Linear result's `processing_date`, or
    /// from `now` for Graph results. Counts only include successful moves.
    pub fn process_at(
        &self,
        result: &DetectionResult,
        dry_run: bool,
        now: DateTime<Utc>,
    ) -> ProcessSummary {
        let processing_date = match result {
            DetectionResult::Linear {
                processing_date, ..
            } => *processing_date,
            DetectionResult::Graph { .. } => now.date_naive(),
        };
        let dated = processing_date.format("%Y-%m-%d").to_string();
        let new_folder = self.config.new_folder.join(&dated);
        let old_folder = self.config.old_folder.join(&dated);

        let mut summary = ProcessSummary {
            kept_count: 0,
            moved_count: 0,
            new_folder,
            old_folder,
            processing_date,
            dry_run,
            planned: Vec::new(),
            failures: Vec::new(),
        };

        if !dry_run {
            let folders = [summary.new_folder.clone(), summary.old_folder.clone()];
            for folder in folders {
                if let Err(err) = fs::create_dir_all(&folder) {
                    warn!(folder = %folder.display(), error = %err, "processor_folder_failure");
                    summary.failures.push(DocumentFailure {
                        path: folder,
                        reason: err.to_string(),
                    });
                    return summary;
                }
            }
        }

        let mut claimed = HashSet::new();
        let kept = result
            .kept_documents()
            .into_iter()
            .map(|doc| (doc, MoveKind::Kept, None));
        let duplicates = result
            .duplicate_documents()
            .into_iter()
            .map(|(doc, base, sim)| (doc, MoveKind::Duplicate, Some((base.to_string(), sim))));

        for (doc, kind, base) in kept.chain(duplicates) {
            let Some(from) = doc.path.clone() else {
                debug!(id = %doc.id, "processor_skip_pathless");
                continue;
            };
            let folder = match kind {
                MoveKind::Kept => &summary.new_folder,
                MoveKind::Duplicate => &summary.old_folder,
            };
            let to = free_target(folder, doc, &mut claimed, now);
            let (base_id, similarity_to_base) = match base {
                Some((id, sim)) => (Some(id), Some(sim)),
                None => (None, None),
            };
            let planned = PlannedMove {
                document_id: doc.id.clone(),
                from,
                to,
                kind,
                base_id,
                similarity_to_base,
            };

            if !dry_run {
                if let Err(err) = move_file(&planned.from, &planned.to) {
                    warn!(
                        from = %planned.from.display(),
                        to = %planned.to.display(),
                        error = %err,
                        "processor_move_failure"
                    );
                    summary.failures.push(DocumentFailure {
                        path: planned.from.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            }
            match kind {
                MoveKind::Kept => summary.kept_count += 1,
                MoveKind::Duplicate => summary.moved_count += 1,
            }
            summary.planned.push(planned);
        }

        info!(
            kept = summary.kept_count,
            moved = summary.moved_count,
            failures = summary.failures.len(),
            dry_run,
            "processor_complete"
        );
        summary
    }
}

/// `folder/file_name`, or `folder/{stem}_{HHMMSS}{.ext}` when that is taken
/// on disk or by an earlier move of this run.
fn free_target(
    folder: &Path,
    doc: &Document,
    claimed: &mut HashSet<PathBuf>,
    now: DateTime<Utc>,
) -> PathBuf {
    let name = Path::new(&doc.file_name);
    let mut target = folder.join(name);
    if is_taken(&target, claimed) {
        let stem = name
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| doc.file_name.clone());
        let ext = name
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let stamp = now.format("%H%M%S").to_string();
        target = folder.join(format!("{stem}_{stamp}{ext}"));
        let mut n = 1;
        while is_taken(&target, claimed) {
            target = folder.join(format!("{stem}_{stamp}_{n}{ext}"));
            n += 1;
        }
    }
    claimed.insert(target.clone());
    target
}

fn is_taken(path: &Path, claimed: &HashSet<PathBuf>) -> bool {
    claimed.contains(path) || path.exists()
}

fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        // Cross-device moves fall back to copy and delete.
        Err(_) if from.is_file() => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use ingest::{analyze, AnalyzerConfig, DocumentSource};
    use matcher::{strategy_for, Algorithm, DetectionConfig, DetectionContext};
    use tempfile::tempdir;

    use super::*;

    const BODY: &str = "Smart plugs let you schedule lamps and fans from your phone \
        while tracking how much energy every appliance draws each day.";

    fn run_linear(dir: &Path) -> DetectionResult {
        let docs: Vec<Document> = ["2024-01-01-plugs.md", "2024-01-03-plugs-again.md"]
            .iter()
            .map(|name| analyze(DocumentSource::path(dir.join(name)), &AnalyzerConfig::default()).unwrap())
            .collect();
        let cfg = DetectionConfig::default()
            .with_algorithm(Algorithm::Linear)
            .with_min_content_length(5);
        strategy_for(cfg.algorithm)
            .detect(&docs, &DetectionContext::new(&cfg))
            .unwrap()
            .completed()
            .unwrap()
    }

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let root = tempdir().unwrap();
        let articles = root.path().join("articles");
        fs::create_dir(&articles).unwrap();
        fs::write(articles.join("2024-01-01-plugs.md"), BODY).unwrap();
        fs::write(articles.join("2024-01-03-plugs-again.md"), BODY).unwrap();
        (root, articles)
    }

    fn processor(root: &Path) -> ResultProcessor {
        ResultProcessor::new(ProcessorConfig {
            new_folder: root.join("new-articles"),
            old_folder: root.join("old-articles"),
        })
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap()
    }

    #[test]
    fn dry_run_plans_without_touching_files() {
        let (root, articles) = fixture();
        let result = run_linear(&articles);
        let summary = processor(root.path()).process_at(&result, true, noon());

        assert_eq!(summary.kept_count, 1);
        assert_eq!(summary.moved_count, 1);
        assert!(summary.dry_run);
        assert!(articles.join("2024-01-03-plugs-again.md").exists());
        assert!(!summary.old_folder.exists());

        let dup = summary
            .planned
            .iter()
            .find(|m| m.kind == MoveKind::Duplicate)
            .unwrap();
        assert!(dup.base_id.as_deref().unwrap().ends_with("2024-01-01-plugs.md"));
        assert_eq!(dup.similarity_to_base, Some(1.0));
    }

    #[test]
    fn moves_into_dated_folders() {
        let (root, articles) = fixture();
        let result = run_linear(&articles);
        let summary = processor(root.path()).process_at(&result, false, noon());

        let dated = match &result {
            DetectionResult::Linear {
                processing_date, ..
            } => processing_date.format("%Y-%m-%d").to_string(),
            DetectionResult::Graph { .. } => unreachable!(),
        };
        assert_eq!(summary.new_folder, root.path().join("new-articles").join(&dated));
        assert!(summary.new_folder.join("2024-01-01-plugs.md").exists());
        assert!(summary.old_folder.join("2024-01-03-plugs-again.md").exists());
        assert!(!articles.join("2024-01-01-plugs.md").exists());
        assert!(summary.failures.is_empty());
    }

    #[test]
    fn collision_gets_time_suffix() {
        let (root, articles) = fixture();
        let result = run_linear(&articles);
        let processor = processor(root.path());
        let planned = processor.process_at(&result, true, noon());
        fs::create_dir_all(&planned.new_folder).unwrap();
        fs::write(planned.new_folder.join("2024-01-01-plugs.md"), "older").unwrap();

        let summary = processor.process_at(&result, false, noon());
        assert!(summary.new_folder.join("2024-01-01-plugs_123045.md").exists());
        assert_eq!(
            fs::read_to_string(summary.new_folder.join("2024-01-01-plugs.md")).unwrap(),
            "older"
        );
    }

    #[test]
    fn unusable_target_folder_leaves_sources_in_place() {
        let (root, articles) = fixture();
        let result = run_linear(&articles);
        // A plain file where the dated folder's parent should be.
        let blocker = root.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let processor = ResultProcessor::new(ProcessorConfig {
            new_folder: blocker.clone(),
            old_folder: root.path().join("old-articles"),
        });

        let summary = processor.process_at(&result, false, noon());
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].path.starts_with(&blocker));
        assert_eq!(summary.kept_count, 0);
        assert_eq!(summary.moved_count, 0);
        assert!(summary.planned.is_empty());
        assert!(articles.join("2024-01-01-plugs.md").exists());
        assert!(articles.join("2024-01-03-plugs-again.md").exists());
    }

    #[test]
    fn text_documents_are_skipped() {
        let root = tempdir().unwrap();
        let docs = vec![
            analyze(DocumentSource::text("2024-01-01-a", BODY), &AnalyzerConfig::default()).unwrap(),
        ];
        let cfg = DetectionConfig::default().with_min_content_length(5);
        let result = strategy_for(Algorithm::Linear)
            .detect(&docs, &DetectionContext::new(&cfg))
            .unwrap()
            .completed()
            .unwrap();
        let summary = processor(root.path()).process_at(&result, true, noon());
        assert_eq!(summary.kept_count, 0);
        assert!(summary.planned.is_empty());
    }
}
