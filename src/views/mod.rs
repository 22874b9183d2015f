//! View builders over an [`AnnotatedBatch`](crate::pipeline::AnnotatedBatch).
//! No model fitting happens here; every sub-aggregate degrades to a
//! documented fallback when its optional columns are absent.

pub mod activity;
pub mod dashboard;

pub use activity::ActivityRow;
pub use dashboard::{Alert, DashboardSummary, DistributionEntry, Summary, TrendPoint};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::pipeline::AnnotatedBatch;
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

/// The two documents the service exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Dashboard,
    UserActivity,
}

impl View {
    pub fn render(self, annotated: &AnnotatedBatch, config: &AnalysisConfig) -> Result<serde_json::Value> {
        let value = match self {
            View::Dashboard => serde_json::to_value(dashboard::build(annotated, config))?,
            View::UserActivity => serde_json::to_value(activity::build(annotated, config))?,
        };
        Ok(value)
    }
}

/// Record counts per risk level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskCounts {
    pub fn add(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
        }
    }
}

impl FromIterator<RiskLevel> for RiskCounts {
    fn from_iter<I: IntoIterator<Item = RiskLevel>>(iter: I) -> Self {
        let mut counts = RiskCounts::default();
        for level in iter {
            counts.add(level);
        }
        counts
    }
}
