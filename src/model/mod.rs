//! Unsupervised models fit and applied to one batch: isolation forest for
//! anomaly flags, k-means for cluster ids. Both are seeded from config.

pub mod isolation;
pub mod kmeans;

pub use isolation::{AnomalyAnnotation, AnomalyScorer, IsolationForest};
pub use kmeans::{kmeans, ClusterAssigner, KmeansResult};
