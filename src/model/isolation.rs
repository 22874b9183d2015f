//! Isolation forest fit and scored on the same batch.
//!
//! Each tree recursively splits a random subsample on a random non-constant
//! feature at a uniform cut point. Points that isolate in few splits score
//! close to 1, ordinary points around 0.5 or below:
//! `s(x) = 2^(-E[h(x)] / c(ψ))`.
//!
//! The anomaly threshold is the `(1 - contamination)` quantile of the batch
//! scores, so roughly `contamination · n` records are flagged.

use crate::config::AnalysisConfig;
use crate::features::FeatureMatrix;
use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Per-record anomaly outcome
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnomalyAnnotation {
    pub is_anomaly: bool,
    /// Higher = more anomalous; independent of the flag threshold
    pub anomaly_score: f64,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Average path length of an unsuccessful BST search over `n` points
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

fn grow(data: ArrayView2<'_, f64>, rows: Vec<usize>, depth: usize, limit: usize, rng: &mut StdRng) -> Node {
    if depth >= limit || rows.len() <= 1 {
        return Node::Leaf { size: rows.len() };
    }

    let candidates: Vec<(usize, f64, f64)> = (0..data.ncols())
        .filter_map(|j| {
            let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                (lo.min(data[[i, j]]), hi.max(data[[i, j]]))
            });
            (hi > lo).then_some((j, lo, hi))
        })
        .collect();
    let Some(&(feature, lo, hi)) = candidates.choose(rng) else {
        return Node::Leaf { size: rows.len() };
    };

    // cut in [lo, hi): both sides non-empty
    let value = lo + rng.gen::<f64>() * (hi - lo);
    let (left, right): (Vec<usize>, Vec<usize>) =
        rows.into_iter().partition(|&i| data[[i, feature]] <= value);

    Node::Split {
        feature,
        value,
        left: Box::new(grow(data, left, depth + 1, limit, rng)),
        right: Box::new(grow(data, right, depth + 1, limit, rng)),
    }
}

fn path_length(mut node: &Node, x: ArrayView1<'_, f64>) -> f64 {
    let mut depth = 0usize;
    loop {
        match node {
            Node::Leaf { size } => return depth as f64 + average_path_length(*size),
            Node::Split {
                feature,
                value,
                left,
                right,
            } => {
                node = if x[*feature] <= *value { left } else { right };
                depth += 1;
            }
        }
    }
}

/// Fitted forest
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit on `data` (rows = points). Expects at least one row.
    pub fn fit(data: ArrayView2<'_, f64>, n_trees: usize, max_samples: usize, rng: &mut StdRng) -> Self {
        let n = data.nrows();
        let sample_size = max_samples.clamp(1, n.max(1));
        let limit = (sample_size.max(2) as f64).log2().ceil() as usize;

        let trees = (0..n_trees.max(1))
            .map(|_| {
                let rows = rand::seq::index::sample(rng, n, sample_size).into_vec();
                grow(data, rows, 0, limit, rng)
            })
            .collect();
        Self { trees, sample_size }
    }

    /// Score in (0, 1]; higher = more anomalous
    pub fn score(&self, x: ArrayView1<'_, f64>) -> f64 {
        let mean = self.trees.iter().map(|t| path_length(t, x)).sum::<f64>() / self.trees.len() as f64;
        let c = average_path_length(self.sample_size);
        if c <= 0.0 {
            return 0.0;
        }
        2f64.powf(-mean / c)
    }
}

/// Linear-interpolated quantile of an ascending slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn has_two_distinct_rows(data: ArrayView2<'_, f64>) -> bool {
    let mut rows = data.rows().into_iter();
    match rows.next() {
        Some(first) => rows.any(|r| r != first),
        None => false,
    }
}

/// Batch anomaly scorer
#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    n_trees: usize,
    max_samples: usize,
    contamination: f64,
    seed: u64,
}

impl AnomalyScorer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            n_trees: config.n_trees,
            max_samples: config.max_samples,
            contamination: config.contamination,
            seed: config.seed,
        }
    }

    /// One annotation per row. Degenerate input (no features, fewer than two
    /// distinct rows) yields all-normal, zero-score annotations.
    pub fn score_batch(&self, features: &FeatureMatrix) -> Vec<AnomalyAnnotation> {
        let data = features.values();
        let n = data.nrows();
        if !features.has_features() || !has_two_distinct_rows(data) {
            if n > 0 {
                warn!(records = n, features = features.n_features(), "degenerate input; anomaly scoring skipped");
            }
            return vec![AnomalyAnnotation::default(); n];
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let forest = IsolationForest::fit(data, self.n_trees, self.max_samples, &mut rng);
        let scores: Vec<f64> = data.rows().into_iter().map(|r| forest.score(r)).collect();

        let mut sorted = scores.clone();
        sorted.sort_by(f64::total_cmp);
        let threshold = quantile(&sorted, 1.0 - self.contamination);

        let annotations: Vec<AnomalyAnnotation> = scores
            .into_iter()
            .map(|s| AnomalyAnnotation {
                is_anomaly: s > threshold,
                anomaly_score: s,
            })
            .collect();
        debug!(
            records = n,
            threshold,
            flagged = annotations.iter().filter(|a| a.is_anomaly).count(),
            "isolation forest scored batch"
        );
        annotations
    }
}
