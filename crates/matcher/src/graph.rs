//! Full pairwise matrix plus connected components.
//!
//! Unlike the linear sweep, a chain A~B~C lands in one group even when A and
//! C are not similar to each other.

use ingest::Document;
use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::score::{batch_vocabulary, PreparedDocument};
use crate::strategy::chronological_order;
use crate::{
    CancellationToken, DetectionContext, DetectionError, DetectionResult,
    DuplicateDetectionStrategy, DuplicateGroup, GroupMember, Outcome, Scorer, SimilarityMatrix,
};

const UNKNOWN_TOPIC: &str = "unknown";

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphStrategy;

/// Upper-triangle cells of one row: `(column, overall, is_duplicate)`.
type Row = Vec<(usize, f64, bool)>;

fn score_row(
    i: usize,
    prepared: &[PreparedDocument<'_>],
    scorer: &Scorer<'_>,
    window: i64,
    cancel: &CancellationToken,
) -> Option<Row> {
    let base = &prepared[i];
    let mut row = Vec::with_capacity(prepared.len() - i - 1);
    for (j, other) in prepared.iter().enumerate().skip(i + 1) {
        if cancel.is_cancelled() {
            return None;
        }
        if base.doc.days_apart(other.doc) > window {
            continue;
        }
        let result = scorer.score_prepared(base, other);
        debug!(
            a = %base.doc.id,
            b = %other.doc.id,
            overall = result.overall_similarity,
            duplicate = result.is_duplicate,
            "pair_scored"
        );
        row.push((j, result.overall_similarity, result.is_duplicate));
    }
    Some(row)
}

/// Connected components by iterative depth-first search, each sorted.
fn connected_components(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut visited = vec![false; adjacency.len()];
    let mut components = Vec::new();
    for start in 0..adjacency.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut stack = vec![start];
        let mut component = Vec::new();
        while let Some(node) = stack.pop() {
            component.push(node);
            for &next in &adjacency[node] {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

impl DuplicateDetectionStrategy for GraphStrategy {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn detect(
        &self,
        docs: &[Document],
        ctx: &DetectionContext<'_>,
    ) -> Result<Outcome, DetectionError> {
        if docs.is_empty() {
            return Err(DetectionError::NoValidDocuments);
        }
        let cfg = ctx.config;
        cfg.validate()?;
        let _span = info_span!("graph_detect", documents = docs.len()).entered();

        let vocabulary = batch_vocabulary(docs, cfg.min_content_length);
        let scorer = Scorer::new(cfg)
            .with_vocabulary(&vocabulary)
            .with_classifier(ctx.classifier.as_ref())
            .with_semantic(ctx.semantic);

        let (valid, short): (Vec<usize>, Vec<usize>) = chronological_order(docs)
            .into_iter()
            .partition(|&i| scorer.is_comparable(&docs[i]));
        let prepared: Vec<_> = valid.iter().map(|&i| scorer.prepare(&docs[i])).collect();
        let n = prepared.len();
        let window = i64::from(cfg.comparison_window_days);

        let rows: Option<Vec<Row>> = if cfg.parallel {
            (0..n)
                .into_par_iter()
                .map(|i| score_row(i, &prepared, &scorer, window, &ctx.cancel))
                .collect()
        } else {
            (0..n)
                .map(|i| score_row(i, &prepared, &scorer, window, &ctx.cancel))
                .collect()
        };
        let Some(rows) = rows else {
            info!("graph_cancelled");
            return Ok(Outcome::Cancelled);
        };

        let mut values = vec![vec![0.0; n]; n];
        let mut adjacency = vec![Vec::new(); n];
        let mut total_comparisons = 0usize;
        for (i, row) in rows.into_iter().enumerate() {
            values[i][i] = 1.0;
            for (j, overall, duplicate) in row {
                total_comparisons += 1;
                values[i][j] = overall;
                values[j][i] = overall;
                if duplicate {
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                }
            }
        }

        let mut duplicate_groups = Vec::new();
        let mut unique_documents: Vec<Document> =
            short.iter().map(|&i| docs[i].clone()).collect();
        for component in connected_components(&adjacency) {
            if component.len() < 2 {
                unique_documents.extend(component.iter().map(|&i| prepared[i].doc.clone()));
                continue;
            }
            let base = component[0];
            let members = component
                .iter()
                .map(|&m| GroupMember {
                    document: prepared[m].doc.clone(),
                    similarity_to_base: values[base][m],
                    is_base: m == base,
                })
                .collect();
            duplicate_groups.push(DuplicateGroup {
                group_id: duplicate_groups.len() + 1,
                base_document: prepared[base].doc.clone(),
                members,
                topic: prepared[base]
                    .topic()
                    .unwrap_or(UNKNOWN_TOPIC)
                    .to_string(),
            });
        }
        unique_documents.sort_by(|a, b| {
            a.effective_date
                .cmp(&b.effective_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        info!(
            groups = duplicate_groups.len(),
            unique = unique_documents.len(),
            comparisons = total_comparisons,
            "graph_complete"
        );
        Ok(Outcome::Completed(DetectionResult::Graph {
            duplicate_groups,
            unique_documents,
            similarity_matrix: SimilarityMatrix::from_rows(
                prepared.iter().map(|p| p.doc.id.clone()).collect(),
                values,
            ),
            total_comparisons,
        }))
    }
}
