//! Lloyd's k-means with seeded k-means++ initialisation.

use crate::config::AnalysisConfig;
use crate::features::FeatureMatrix;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Result of a batch k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansResult {
    /// Cluster id per point, in input order.
    pub labels: Vec<usize>,
    /// Final centroids, indexed by cluster id.
    pub centroids: Array2<f64>,
    /// Effective k (requested k collapsed to the number of distinct points).
    pub k: usize,
    pub iterations: usize,
    /// Sum of squared distances from each point to its centroid.
    pub inertia: f64,
}

#[inline]
fn squared_euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Nearest centroid; ties go to the lowest id.
fn nearest_centroid(point: ArrayView1<'_, f64>, centroids: &Array2<f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let d = squared_euclidean(point, centroid);
        if d < best_dist {
            best_dist = d;
            best = c;
        }
    }
    best
}

fn distinct_rows(data: ArrayView2<'_, f64>, cap: usize) -> usize {
    let mut seen: HashSet<Vec<u64>> = HashSet::new();
    for row in data.rows() {
        // +0.0 and -0.0 are the same point
        seen.insert(row.iter().map(|v| (v + 0.0).to_bits()).collect());
        if seen.len() >= cap {
            break;
        }
    }
    seen.len()
}

/// D²-weighted seeding. Requires `k` <= number of distinct rows.
fn kmeanspp_init(data: ArrayView2<'_, f64>, k: usize, rng: &mut StdRng) -> Array2<f64> {
    let n = data.nrows();
    let mut centroids = Array2::<f64>::zeros((k, data.ncols()));
    centroids.row_mut(0).assign(&data.row(rng.gen_range(0..n)));

    let mut d2: Vec<f64> = data
        .rows()
        .into_iter()
        .map(|r| squared_euclidean(r, centroids.row(0)))
        .collect();

    for c in 1..k {
        let total: f64 = d2.iter().sum();
        let target = rng.gen::<f64>() * total;
        let mut acc = 0.0;
        let mut pick = None;
        for (i, &w) in d2.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            acc += w;
            pick = Some(i);
            if acc > target {
                break;
            }
        }
        let Some(pick) = pick else { break };
        centroids.row_mut(c).assign(&data.row(pick));
        for (i, r) in data.rows().into_iter().enumerate() {
            d2[i] = d2[i].min(squared_euclidean(r, centroids.row(c)));
        }
    }
    centroids
}

/// Run k-means over the rows of `data`. Always terminates: `k` collapses to
/// the number of distinct rows, empty clusters keep their previous centroid.
pub fn kmeans(data: ArrayView2<'_, f64>, k: usize, max_iterations: usize, rng: &mut StdRng) -> KmeansResult {
    let n = data.nrows();
    if n == 0 {
        return KmeansResult {
            labels: Vec::new(),
            centroids: Array2::zeros((0, data.ncols())),
            k: 0,
            iterations: 0,
            inertia: 0.0,
        };
    }

    let requested = k.max(1);
    let k = distinct_rows(data, requested);
    let mut centroids = kmeanspp_init(data, k, rng);
    let mut labels = vec![usize::MAX; n];
    let mut iterations = 0;

    for _ in 0..max_iterations.max(1) {
        iterations += 1;

        let mut changed = false;
        for (i, row) in data.rows().into_iter().enumerate() {
            let nearest = nearest_centroid(row, &centroids);
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = Array2::<f64>::zeros(centroids.raw_dim());
        let mut counts = vec![0usize; k];
        for (row, &label) in data.rows().into_iter().zip(&labels) {
            let mut s = sums.row_mut(label);
            s += &row;
            counts[label] += 1;
        }
        for (c, count) in counts.iter().enumerate() {
            if *count > 0 {
                let mean: Array1<f64> = sums.row(c).mapv(|v| v / *count as f64);
                centroids.row_mut(c).assign(&mean);
            }
        }
    }

    let inertia = data
        .axis_iter(Axis(0))
        .zip(&labels)
        .map(|(row, &label)| squared_euclidean(row, centroids.row(label)))
        .sum();

    KmeansResult {
        labels,
        centroids,
        k,
        iterations,
        inertia,
    }
}

/// Batch cluster assigner
#[derive(Debug, Clone)]
pub struct ClusterAssigner {
    clusters: usize,
    max_iterations: usize,
    seed: u64,
}

impl ClusterAssigner {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            clusters: config.clusters,
            max_iterations: config.max_iterations,
            seed: config.seed,
        }
    }

    /// Cluster id per record. Ids only mean something within one run.
    pub fn assign(&self, features: &FeatureMatrix) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let result = kmeans(features.values(), self.clusters, self.max_iterations, &mut rng);
        if features.n_records() > 0 && result.k < self.clusters {
            warn!(requested = self.clusters, effective = result.k, "fewer distinct points than clusters");
        }
        debug!(k = result.k, iterations = result.iterations, inertia = result.inertia, "k-means converged");
        result.labels
    }
}
