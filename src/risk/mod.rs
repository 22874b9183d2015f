//! Risk classification: explicit risk field when the batch has one, anomaly flag otherwise.

mod engine;

pub use engine::{RiskEngine, RiskLevel, RiskSource, RiskThresholds};
