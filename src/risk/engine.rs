//! Maps a risk-determining value to a discrete risk level via fixed thresholds.

use crate::config::AnalysisConfig;
use crate::model::AnomalyAnnotation;
use crate::records::{Record, RecordBatch};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Upper bounds (inclusive) of the Low and Medium bins; everything above is High.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub low_max: f64,
    pub medium_max: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_max: 3.0,
            medium_max: 6.0,
        }
    }
}

impl RiskLevel {
    /// `(-inf, low_max]` Low, `(low_max, medium_max]` Medium, above High
    pub fn from_score(score: f64, thresholds: &RiskThresholds) -> Self {
        if score <= thresholds.low_max {
            RiskLevel::Low
        } else if score <= thresholds.medium_max {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Fallback path: anomalous → High, otherwise Low. Medium is unreachable here.
    pub fn from_anomaly(is_anomaly: bool) -> Self {
        if is_anomaly {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// Where a batch's risk-determining value comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum RiskSource {
    /// Numeric column present in the batch
    Field(String),
    AnomalyFlag,
}

pub struct RiskEngine {
    thresholds: RiskThresholds,
    risk_field: String,
}

impl RiskEngine {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            thresholds: config.thresholds,
            risk_field: config.risk_field.clone(),
        }
    }

    /// The configured risk field counts only when it is a numeric column of the batch
    pub fn source_for(&self, batch: &RecordBatch) -> RiskSource {
        if batch.is_numeric_column(&self.risk_field) {
            RiskSource::Field(self.risk_field.clone())
        } else {
            RiskSource::AnomalyFlag
        }
    }

    /// Missing values in the risk field impute to zero, as in feature scaling
    pub fn classify(&self, source: &RiskSource, record: &Record, anomaly: &AnomalyAnnotation) -> RiskLevel {
        match source {
            RiskSource::Field(name) => {
                let value = record.get(name).as_number().unwrap_or(0.0);
                RiskLevel::from_score(value, &self.thresholds)
            }
            RiskSource::AnomalyFlag => RiskLevel::from_anomaly(anomaly.is_anomaly),
        }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }
}
