//! Performance benchmarks for the probe's aggregation and reporting path
//!
//! Every recorded sample passes through the metrics registry and every
//! summary through the percentile code, so those are what is measured here.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pocker_health::{
    models::{MetricsRegistry, TrendValues},
    output::{emit_summary, FormattingOptions, P95Report},
    server::health_response,
    stats::{calculate_percentile, sorted_samples},
    ServerConfig, Target,
};
use std::hint::black_box;
use std::time::Instant;

/// Deterministic latency-like samples in milliseconds
fn create_samples(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| 40.0 + (i * 7919 % 600) as f64 + (i % 13) as f64 / 13.0)
        .collect()
}

/// A registry filled the way a full run would fill it
fn create_registry(per_trend: usize) -> MetricsRegistry {
    let registry = MetricsRegistry::new();
    for target in Target::ALL {
        for sample in create_samples(per_trend) {
            registry.add(target.duration_trend(), sample);
            if let Some(internal) = target.internal_trend() {
                registry.add(internal, sample / 4.0);
            }
        }
    }
    registry
}

fn benchmark_percentile(c: &mut Criterion) {
    let mut group = c.benchmark_group("percentile");

    for size in [100usize, 1_000, 10_000] {
        let samples = create_samples(size);
        group.bench_with_input(BenchmarkId::new("sort_and_p95", size), &samples, |b, samples| {
            b.iter(|| {
                let sorted = sorted_samples(black_box(samples)).unwrap();
                calculate_percentile(&sorted, 95.0)
            })
        });
        group.bench_with_input(BenchmarkId::new("trend_values", size), &samples, |b, samples| {
            b.iter(|| TrendValues::from_samples(black_box(samples)).unwrap())
        });
    }

    group.finish();
}

fn benchmark_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");

    group.bench_function("add_sample", |b| {
        let registry = MetricsRegistry::new();
        b.iter(|| registry.add(black_box("http_req_duration_direct"), black_box(123.4)))
    });

    // Default run: 10 VUs x 100 iterations
    let registry = create_registry(1_000);
    group.bench_function("snapshot_default_run", |b| b.iter(|| registry.snapshot()));

    group.finish();
}

fn benchmark_report(c: &mut Criterion) {
    let summary = create_registry(1_000).snapshot();
    let report = P95Report::new(FormattingOptions::plain().with_internal(true));

    c.bench_function("p95_report_render", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(256);
            emit_summary(&report, black_box(&summary), &mut out).unwrap();
            out
        })
    });
}

fn benchmark_health_response(c: &mut Criterion) {
    let plain = ServerConfig::default();
    let timed = ServerConfig {
        timing_headers: true,
        region: Some("sjc".to_string()),
        ..ServerConfig::default()
    };

    c.bench_function("health_response_plain", |b| {
        b.iter(|| health_response(black_box(&plain), Instant::now()))
    });
    c.bench_function("health_response_timing_headers", |b| {
        b.iter(|| health_response(black_box(&timed), Instant::now()))
    });
}

criterion_group!(
    benches,
    benchmark_percentile,
    benchmark_registry,
    benchmark_report,
    benchmark_health_response
);
criterion_main!(benches);
