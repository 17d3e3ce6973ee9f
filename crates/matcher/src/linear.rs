//! Chronological base-versus-rest sweep.
//!
//! The earliest remaining document becomes the base and absorbs every later
//! in-window document that scores at or above the threshold against it. Only
//! the base is compared, so chains are not followed: if B duplicates A and C
//! duplicates B but not A, C survives as its own base. Use the Graph strategy
//! when transitive groups matter.

use std::collections::VecDeque;

use chrono::Utc;
use ingest::Document;
use tracing::{debug, info, info_span};

use crate::score::batch_vocabulary;
use crate::strategy::chronological_order;
use crate::{
    DetectionContext, DetectionError, DetectionResult, DuplicateDetectionStrategy, MemberRecord,
    Outcome, Scorer,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearStrategy;

impl DuplicateDetectionStrategy for LinearStrategy {
    fn name(&self) -> &'static str {
        "linear"
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
        let _span = info_span!("linear_detect", documents = docs.len()).entered();

        let vocabulary = batch_vocabulary(docs, cfg.min_content_length);
        let scorer = Scorer::new(cfg)
            .with_vocabulary(&vocabulary)
            .with_classifier(ctx.classifier.as_ref())
            .with_semantic(ctx.semantic);
        let prepared: Vec<_> = docs.iter().map(|d| scorer.prepare(d)).collect();
        let window = i64::from(cfg.comparison_window_days);

        let mut queue: VecDeque<usize> = chronological_order(docs).into();
        let mut kept = Vec::new();
        let mut moved = Vec::new();
        let mut total_comparisons = 0usize;

        while let Some(base) = queue.pop_front() {
            let base_doc = &docs[base];
            kept.push(base_doc.clone());
            let mut remaining = VecDeque::with_capacity(queue.len());

            for candidate in queue.drain(..) {
                if ctx.cancel.is_cancelled() {
                    info!(comparisons = total_comparisons, "linear_cancelled");
                    return Ok(Outcome::Cancelled);
                }
                let candidate_doc = &docs[candidate];
                if base_doc.days_apart(candidate_doc) > window
                    || !scorer.is_comparable(base_doc)
                    || !scorer.is_comparable(candidate_doc)
                {
                    remaining.push_back(candidate);
                    continue;
                }

                total_comparisons += 1;
                let result = scorer.score_prepared(&prepared[base], &prepared[candidate]);
                debug!(
                    base = %base_doc.id,
                    candidate = %candidate_doc.id,
                    overall = result.overall_similarity,
                    threshold = result.threshold_used,
                    duplicate = result.is_duplicate,
                    "pair_scored"
                );
                if result.is_duplicate {
                    moved.push(MemberRecord {
                        document: candidate_doc.clone(),
                        base_id: base_doc.id.clone(),
                        similarity_to_base: result.overall_similarity,
                        cross_topic: result.cross_topic,
                        threshold_used: result.threshold_used,
                        result,
                    });
                } else {
                    remaining.push_back(candidate);
                }
            }
            queue = remaining;
        }

        info!(
            kept = kept.len(),
            moved = moved.len(),
            comparisons = total_comparisons,
            "linear_complete"
        );
        Ok(Outcome::Completed(DetectionResult::Linear {
            kept,
            moved,
            total_comparisons,
            processing_date: Utc::now().date_naive(),
        }))
    }
}
