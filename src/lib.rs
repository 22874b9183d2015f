//! Riskscope — activity risk analysis over a record batch.
//!
//! Modular structure:
//! - [`records`] — Loosely typed records, alias resolution, CSV/JSON loaders
//! - [`features`] — Min-max feature normalization
//! - [`model`] — Isolation forest anomaly scoring and k-means clustering
//! - [`risk`] — Risk level classification
//! - [`pipeline`] — Shared scoring pipeline producing annotated batches
//! - [`views`] — Dashboard and user activity documents
//! - [`server`] — HTTP routes
//! - [`logging`] — Structured JSON logging

pub mod config;
pub mod error;
pub mod records;
pub mod features;
pub mod model;
pub mod risk;
pub mod pipeline;
pub mod views;
pub mod server;
pub mod logging;

pub use config::{AnalysisConfig, ServiceConfig};
pub use error::{Error, Result};
pub use records::{FieldValue, Record, RecordBatch};
pub use features::FeatureMatrix;
pub use model::{AnomalyScorer, ClusterAssigner};
pub use risk::{RiskEngine, RiskLevel};
pub use pipeline::{analyze, AnnotatedBatch};
pub use views::View;
pub use logging::StructuredLogger;
