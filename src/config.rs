//! Service configuration. Every pipeline constant lives in [`AnalysisConfig`].

use crate::error::{Error, Result};
use crate::risk::RiskThresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Record source loaded on every request (.csv, .json, .ndjson)
    pub data_path: PathBuf,
    /// Listen address for the HTTP service
    pub bind: String,
    /// Scoring pipeline parameters
    pub analysis: AnalysisConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Expected anomalous fraction of a batch, in (0, 0.5]
    pub contamination: f64,
    /// Seed shared by the isolation forest and k-means
    pub seed: u64,
    /// Number of isolation trees
    pub n_trees: usize,
    /// Subsample size per isolation tree (capped at the batch size)
    pub max_samples: usize,
    /// Number of k-means clusters
    pub clusters: usize,
    /// Lloyd iteration cap
    pub max_iterations: usize,
    pub thresholds: RiskThresholds,
    /// Entries kept in the threat distribution
    pub top_n: usize,
    /// Records projected into alert / activity lists
    pub sample_size: usize,
    /// Approximate number of trend points
    pub trend_buckets: usize,
    /// Explicit numeric risk column; anomaly flag is used when absent
    pub risk_field: String,
    /// Categorical column used for event type and distribution
    pub category_field: String,
    /// Identity column aliases, highest priority first
    pub identity_aliases: Vec<String>,
    pub location_field: String,
    pub device_field: String,
    pub timestamp_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("insider_threat_detection.csv"),
            bind: "127.0.0.1:8001".to_string(),
            analysis: AnalysisConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            contamination: 0.1,
            seed: 42,
            n_trees: 100,
            max_samples: 256,
            clusters: 3,
            max_iterations: 300,
            thresholds: RiskThresholds::default(),
            top_n: 10,
            sample_size: 10,
            trend_buckets: 6,
            risk_field: "riskScore".to_string(),
            category_field: "activity".to_string(),
            identity_aliases: ["User", "user", "username", "actor", "employee"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            location_field: "location".to_string(),
            device_field: "device".to_string(),
            timestamp_field: "timestamp".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl ServiceConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|data| serde_json::from_str::<ServiceConfig>(&data).map_err(|e| e.to_string()));
        match parsed {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config unreadable; using defaults");
                Self::default()
            }
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(Error::InvalidConfig(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        if self.clusters == 0 {
            return Err(Error::InvalidConfig("clusters must be at least 1".into()));
        }
        if self.n_trees == 0 || self.max_samples == 0 {
            return Err(Error::InvalidConfig(
                "n_trees and max_samples must be at least 1".into(),
            ));
        }
        if self.trend_buckets == 0 {
            return Err(Error::InvalidConfig("trend_buckets must be at least 1".into()));
        }
        if self.thresholds.low_max > self.thresholds.medium_max {
            return Err(Error::InvalidConfig(format!(
                "low_max ({}) exceeds medium_max ({})",
                self.thresholds.low_max, self.thresholds.medium_max
            )));
        }
        Ok(())
    }
}
