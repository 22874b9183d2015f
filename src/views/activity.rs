//! User activity document: the first records with identity, activity, anomaly
//! score and risk level. Optional display columns render as "".

use crate::config::AnalysisConfig;
use crate::pipeline::AnnotatedBatch;
use crate::records::{resolve_alias, Record};
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub user: String,
    pub activity: String,
    /// Anomaly score of the record; higher = more anomalous
    #[serde(rename = "riskScore")]
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub location: String,
    pub device: String,
    pub timestamp: String,
}

fn optional(record: &Record, annotated: &AnnotatedBatch, field: &str) -> String {
    if annotated.has_column(field) {
        record.get(field).to_display()
    } else {
        String::new()
    }
}

/// Empty when no identity alias resolves or the category column is absent
pub fn build(annotated: &AnnotatedBatch, config: &AnalysisConfig) -> Vec<ActivityRow> {
    let Some(user_col) = resolve_alias(annotated.columns(), &config.identity_aliases) else {
        return Vec::new();
    };
    if !annotated.has_column(&config.category_field) {
        return Vec::new();
    }

    annotated
        .iter()
        .take(config.sample_size)
        .map(|(record, a)| ActivityRow {
            user: record.get(user_col).to_display(),
            activity: record.get(&config.category_field).to_display(),
            risk_score: a.anomaly_score,
            risk_level: a.risk_level,
            location: optional(record, annotated, &config.location_field),
            device: optional(record, annotated, &config.device_field),
            timestamp: optional(record, annotated, &config.timestamp_field),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyze;
    use crate::records::{FieldValue, RecordBatch};

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn missing_optional_fields_render_empty() {
        let config = AnalysisConfig::default();
        let batch: RecordBatch = (0..15)
            .map(|i| {
                Record::new()
                    .with("employee", text(&format!("e{i}")))
                    .with("activity", text("download"))
                    .with("device", text("laptop"))
                    .with("bytes", FieldValue::Number(i as f64))
            })
            .collect();
        let rows = build(&analyze(batch, &config), &config);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[3].user, "e3");
        assert_eq!(rows[3].device, "laptop");
        assert_eq!(rows[3].location, "");
        assert_eq!(rows[3].timestamp, "");

        let json = serde_json::to_value(&rows[0]).unwrap();
        for key in ["user", "activity", "riskScore", "risk_level", "location", "device", "timestamp"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn requires_identity_and_activity() {
        let config = AnalysisConfig::default();
        let no_user: RecordBatch = (0..3).map(|_| Record::new().with("activity", text("login"))).collect();
        assert!(build(&analyze(no_user, &config), &config).is_empty());

        let no_activity: RecordBatch = (0..3).map(|_| Record::new().with("user", text("a"))).collect();
        assert!(build(&analyze(no_activity, &config), &config).is_empty());
    }

    #[test]
    fn empty_batch() {
        let config = AnalysisConfig::default();
        assert!(build(&analyze(RecordBatch::default(), &config), &config).is_empty());
    }
}
