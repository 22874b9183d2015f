//! Pipeline benchmark: record batch → annotated batch → dashboard document.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use riskscope::config::AnalysisConfig;
use riskscope::pipeline::analyze;
use riskscope::records::{FieldValue, Record, RecordBatch};
use riskscope::views::dashboard;

fn make_dummy_records(n: usize) -> RecordBatch {
    (0..n)
        .map(|i| {
            Record::new()
                .with("user", FieldValue::Text(format!("user_{}", i % 50)))
                .with("activity", FieldValue::Text(format!("act_{}", i % 13)))
                .with("riskScore", FieldValue::Number((i % 10) as f64))
                .with("bytes", FieldValue::Number(((i * 7919) % 1000) as f64))
                .with("logins", FieldValue::Number((i % 17) as f64))
        })
        .collect()
}

fn bench_analyze(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let mut g = c.benchmark_group("analyze");
    for n in [100, 1_000, 10_000] {
        let batch = make_dummy_records(n);
        g.bench_function(format!("records_{}", n).as_str(), |b| {
            b.iter(|| black_box(analyze(black_box(batch.clone()), &config)))
        });
    }
    g.finish();
}

fn bench_dashboard_view(c: &mut Criterion) {
    let config = AnalysisConfig::default();
    let annotated = analyze(make_dummy_records(10_000), &config);

    c.bench_function("dashboard_view_10k", |b| {
        b.iter(|| black_box(dashboard::build(black_box(&annotated), &config)))
    });
}

criterion_group!(benches, bench_analyze, bench_dashboard_view);
criterion_main!(benches);
