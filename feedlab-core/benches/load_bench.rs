//! Criterion benchmarks for feed loading.
//!
//! Benchmarks:
//! 1. Column mapping validation
//! 2. MT4 CSV parse (in-memory, date + time merge)
//! 3. Full file load through `Feed::mt4`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fmt::Write as _;

use feedlab_core::{ColumnLayout, ColumnMapping, CsvLoader, CsvOptions, Feed};

// ── Helpers ──────────────────────────────────────────────────────────

/// Minute bars in MT4 export format.
fn make_mt4_csv(n: usize) -> String {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut out = String::with_capacity(n * 48);
    for i in 0..n {
        let ts = base + chrono::Duration::minutes(i as i64);
        let close = 1.1 + (i as f64 * 0.01).sin() * 0.01;
        let _ = writeln!(
            out,
            "{},{},{:.5},{:.5},{:.5},{:.5},{}",
            ts.format("%Y.%m.%d"),
            ts.format("%H:%M"),
            close - 0.0003,
            close + 0.0015,
            close - 0.0015,
            close,
            100 + i % 500,
        );
    }
    out
}

// ── 1. Column mapping ────────────────────────────────────────────────

fn bench_mapping(c: &mut Criterion) {
    let layout = ColumnLayout {
        adj_close: Some(7),
        ..ColumnLayout::mt4()
    };
    c.bench_function("column_mapping_8_fields", |b| {
        b.iter(|| ColumnMapping::new(black_box(&layout), "%Y.%m.%d", "%H:%M"))
    });
}

// ── 2. In-memory parse ───────────────────────────────────────────────

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("mt4_parse");
    let loader = CsvLoader::new(&CsvOptions::mt4()).unwrap();

    for &rows in &[1_000, 10_000, 100_000] {
        let text = make_mt4_csv(rows);
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, _| {
            b.iter(|| loader.read(black_box(text.as_bytes())).unwrap())
        });
    }

    group.finish();
}

// ── 3. File load ─────────────────────────────────────────────────────

fn bench_file_load(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("EURUSD1.csv");
    std::fs::write(&path, make_mt4_csv(10_000)).unwrap();

    c.bench_function("feed_mt4_10k_rows", |b| {
        b.iter(|| Feed::mt4(black_box(&path), &CsvOptions::default()).unwrap())
    });
}

criterion_group!(benches, bench_mapping, bench_parse, bench_file_load);
criterion_main!(benches);
