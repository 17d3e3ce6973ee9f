use serde::{Deserialize, Serialize};

use crate::SimilarityMatrix;

/// Summary of the pairwise similarities of one run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SimilarityStats {
    pub count: usize,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
}

impl SimilarityStats {
    /// Stats over the upper triangle, ignoring zero (out-of-window) cells.
    pub fn from_matrix(matrix: &SimilarityMatrix) -> Self {
        let n = matrix.len();
        let mut scores = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                let value = matrix.get(i, j);
                if value > 0.0 {
                    scores.push(value);
                }
            }
        }
        Self::from_scores(scores)
    }

    /// All-zero stats for an empty input.
    pub fn from_scores(mut scores: Vec<f64>) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        scores.sort_by(f64::total_cmp);
        let count = scores.len();
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (scores[mid - 1] + scores[mid]) / 2.0
        } else {
            scores[mid]
        };
        Self {
            count,
            max: scores[count - 1],
            min: scores[0],
            mean: scores.iter().sum::<f64>() / count as f64,
            median,
        }
    }
}
