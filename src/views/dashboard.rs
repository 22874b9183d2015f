//! Dashboard document: summary counts, cumulative risk trend, recent alerts
//! and the top-N distribution of the category column.

use super::RiskCounts;
use crate::config::AnalysisConfig;
use crate::pipeline::AnnotatedBatch;
use crate::records::resolve_alias;
use crate::risk::RiskLevel;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub summary: Summary,
    pub risk_trends: Vec<TrendPoint>,
    pub recent_alerts: Vec<Alert>,
    pub threat_distribution: Vec<DistributionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_records: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    /// Populated cluster id → record count
    pub clusters: BTreeMap<usize, usize>,
}

/// Counts over records `[0, time)`; cumulative from the batch start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub time: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "User", default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(rename = "EventType", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub name: String,
    pub value: usize,
}

pub fn build(annotated: &AnnotatedBatch, config: &AnalysisConfig) -> DashboardSummary {
    let counts: RiskCounts = annotated.risk_levels().collect();

    let mut clusters = BTreeMap::new();
    for a in annotated.annotations() {
        *clusters.entry(a.cluster).or_insert(0) += 1;
    }

    let levels: Vec<RiskLevel> = annotated.risk_levels().collect();
    DashboardSummary {
        summary: Summary {
            total_records: annotated.len(),
            high_risk: counts.high,
            medium_risk: counts.medium,
            low_risk: counts.low,
            clusters,
        },
        risk_trends: risk_trends(&levels, config.trend_buckets),
        recent_alerts: recent_alerts(annotated, config),
        threat_distribution: distribution(annotated, &config.category_field, config.top_n),
    }
}

/// One point per prefix boundary `0, step, 2·step, … < len`, with
/// `step = max(1, len / buckets)`. Each point counts records `[0, i)`.
pub fn risk_trends(levels: &[RiskLevel], buckets: usize) -> Vec<TrendPoint> {
    let step = (levels.len() / buckets.max(1)).max(1);
    let mut prefix = RiskCounts::default();
    let mut points = Vec::new();
    for (i, &level) in levels.iter().enumerate() {
        if i % step == 0 {
            points.push(TrendPoint {
                time: i,
                high_risk: prefix.high,
                medium_risk: prefix.medium,
                low_risk: prefix.low,
            });
        }
        prefix.add(level);
    }
    points
}

/// Top-N category counts, descending; ties keep first-seen order.
/// Without the column the whole batch is reported as one "Unknown" entry.
pub fn distribution(annotated: &AnnotatedBatch, field: &str, top_n: usize) -> Vec<DistributionEntry> {
    if !annotated.has_column(field) {
        return vec![DistributionEntry {
            name: UNKNOWN_CATEGORY.to_string(),
            value: annotated.len(),
        }];
    }

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for record in annotated.records() {
        let value = record.get(field);
        if !value.is_null() {
            *counts.entry(value.to_display()).or_insert(0) += 1;
        }
    }
    // stable: equal counts stay in first-seen order
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
        .into_iter()
        .take(top_n)
        .map(|(name, value)| DistributionEntry { name, value })
        .collect()
}

/// First `sample_size` records projected to identity, event type and risk level
pub fn recent_alerts(annotated: &AnnotatedBatch, config: &AnalysisConfig) -> Vec<Alert> {
    let user_col = resolve_alias(annotated.columns(), &config.identity_aliases);
    let has_category = annotated.has_column(&config.category_field);
    annotated
        .iter()
        .take(config.sample_size)
        .map(|(record, a)| Alert {
            user: user_col.map(|c| record.get(c).to_display()),
            event_type: has_category.then(|| record.get(&config.category_field).to_display()),
            risk_level: a.risk_level,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyze;
    use crate::records::{FieldValue, Record, RecordBatch};

    fn levels(spec: &str) -> Vec<RiskLevel> {
        spec.chars()
            .map(|c| match c {
                'H' => RiskLevel::High,
                'M' => RiskLevel::Medium,
                _ => RiskLevel::Low,
            })
            .collect()
    }

    #[test]
    fn trend_is_cumulative_from_start() {
        let lv = levels("HHMLLLHMLLLH");
        let points = risk_trends(&lv, 6);
        let times: Vec<usize> = points.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0, 2, 4, 6, 8, 10]);
        // position 4 covers [0, 4): H H M L
        assert_eq!(
            points[2],
            TrendPoint {
                time: 4,
                high_risk: 2,
                medium_risk: 1,
                low_risk: 1
            }
        );
        assert_eq!(points[0].high_risk + points[0].medium_risk + points[0].low_risk, 0);
    }

    #[test]
    fn trend_small_batch_steps_by_one() {
        let points = risk_trends(&levels("HLM"), 6);
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].high_risk, 1);
        assert_eq!(points[2].low_risk, 1);
        assert_eq!(points[2].medium_risk, 0);
    }

    #[test]
    fn trend_empty() {
        assert!(risk_trends(&[], 6).is_empty());
    }

    fn categorical_batch(values: &[&str]) -> AnnotatedBatch {
        let batch: RecordBatch = values
            .iter()
            .map(|v| Record::new().with("activity", FieldValue::Text(v.to_string())))
            .collect();
        analyze(batch, &AnalysisConfig::default())
    }

    #[test]
    fn distribution_truncates_to_top_n() {
        let mut values = Vec::new();
        for i in 0..15 {
            for _ in 0..=(i % 4) {
                values.push(format!("cat{i}"));
            }
        }
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let d = distribution(&categorical_batch(&refs), "activity", 10);
        assert_eq!(d.len(), 10);
        assert!(d.windows(2).all(|w| w[0].value >= w[1].value));
        // cat3, cat7, cat11 have 4 each, in first-seen order
        assert_eq!(d[0].name, "cat3");
        assert_eq!(d[1].name, "cat7");
        assert_eq!(d[2].name, "cat11");
    }

    #[test]
    fn distribution_missing_column_is_unknown() {
        let batch: RecordBatch = (0..4).map(|i| Record::new().with("n", FieldValue::Number(i as f64))).collect();
        let annotated = analyze(batch, &AnalysisConfig::default());
        let d = distribution(&annotated, "activity", 10);
        assert_eq!(
            d,
            vec![DistributionEntry {
                name: "Unknown".into(),
                value: 4
            }]
        );
    }

    #[test]
    fn alerts_shape_follows_available_columns() {
        let config = AnalysisConfig::default();
        let batch: RecordBatch = (0..12)
            .map(|i| {
                Record::new()
                    .with("username", FieldValue::Text(format!("name{i}")))
                    .with("user", FieldValue::Text(format!("u{i}")))
                    .with("activity", FieldValue::Text("login".into()))
            })
            .collect();
        let alerts = recent_alerts(&analyze(batch, &config), &config);
        assert_eq!(alerts.len(), 10);
        assert_eq!(alerts[0].user.as_deref(), Some("u0"));
        assert_eq!(alerts[0].event_type.as_deref(), Some("login"));

        let bare: RecordBatch = (0..3).map(|i| Record::new().with("n", FieldValue::Number(i as f64))).collect();
        let alerts = recent_alerts(&analyze(bare, &config), &config);
        assert_eq!(alerts.len(), 3);
        assert!(alerts.iter().all(|a| a.user.is_none() && a.event_type.is_none()));
        let json = serde_json::to_value(&alerts[0]).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["risk_level"]);
    }

    #[test]
    fn empty_batch_degrades() {
        let config = AnalysisConfig::default();
        let d = build(&analyze(RecordBatch::default(), &config), &config);
        assert_eq!(d.summary.total_records, 0);
        assert_eq!(d.summary.high_risk + d.summary.medium_risk + d.summary.low_risk, 0);
        assert!(d.summary.clusters.is_empty());
        assert!(d.risk_trends.is_empty());
        assert!(d.recent_alerts.is_empty());
        assert_eq!(d.threat_distribution, vec![DistributionEntry { name: "Unknown".into(), value: 0 }]);
    }
}
