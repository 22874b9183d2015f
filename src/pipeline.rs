//! Shared scoring pipeline: records → normalized features → {isolation forest,
//! k-means} → risk level. Both views consume the resulting [`AnnotatedBatch`].

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::features::normalize;
use crate::model::{AnomalyScorer, ClusterAssigner};
use crate::records::{self, Record, RecordBatch};
use crate::risk::{RiskEngine, RiskLevel, RiskSource};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, info_span};

/// Derived fields for one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub is_anomaly: bool,
    pub anomaly_score: f64,
    pub cluster: usize,
    pub risk_level: RiskLevel,
}

/// A batch and its per-record annotations, index-aligned
#[derive(Debug, Clone)]
pub struct AnnotatedBatch {
    batch: RecordBatch,
    columns: Vec<String>,
    annotations: Vec<Annotation>,
    risk_source: RiskSource,
}

impl AnnotatedBatch {
    pub fn records(&self) -> &[Record] {
        self.batch.records()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Record, &Annotation)> {
        self.batch.records().iter().zip(&self.annotations)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Batch columns in first-seen order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn risk_source(&self) -> &RiskSource {
        &self.risk_source
    }

    pub fn risk_levels(&self) -> impl Iterator<Item = RiskLevel> + '_ {
        self.annotations.iter().map(|a| a.risk_level)
    }
}

/// Run the full pipeline over one batch. Infallible: degenerate input
/// resolves to neutral scores and collapsed clusters.
pub fn analyze(batch: RecordBatch, config: &AnalysisConfig) -> AnnotatedBatch {
    let _span = info_span!("analyze", records = batch.len()).entered();

    let features = normalize(&batch);
    let anomalies = AnomalyScorer::new(config).score_batch(&features);
    let clusters = ClusterAssigner::new(config).assign(&features);

    let engine = RiskEngine::new(config);
    let risk_source = engine.source_for(&batch);

    let annotations: Vec<Annotation> = batch
        .records()
        .iter()
        .zip(anomalies.iter().zip(&clusters))
        .map(|(record, (anomaly, &cluster))| Annotation {
            is_anomaly: anomaly.is_anomaly,
            anomaly_score: anomaly.anomaly_score,
            cluster,
            risk_level: engine.classify(&risk_source, record, anomaly),
        })
        .collect();

    info!(
        records = annotations.len(),
        features = features.n_features(),
        anomalies = annotations.iter().filter(|a| a.is_anomaly).count(),
        risk_source = ?risk_source,
        "batch analyzed"
    );

    AnnotatedBatch {
        columns: batch.columns(),
        batch,
        annotations,
        risk_source,
    }
}

/// Load a fresh batch from `path` and analyze it. Each call owns its batch.
pub fn analyze_path(path: &Path, config: &AnalysisConfig) -> Result<AnnotatedBatch> {
    let batch = records::load(path)?;
    Ok(analyze(batch, config))
}
