//! Criterion benchmarks for the paged width series.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use surfdep_series::{BackgroundStore, FileStore, MemoryStore, PagedSeries};

const N: u64 = 1 << 20;

/// Benchmark: append 1M widths in 64K pages to process memory.
fn bench_append_memory(c: &mut Criterion) {
    c.bench_function("append_1m_memory", |b| {
        b.iter(|| {
            let mut series = PagedSeries::new(MemoryStore::new(), 1 << 16).unwrap();
            for i in 0..N {
                series.append(i as f64).unwrap();
            }
            black_box(series.len())
        });
    });
}

/// Benchmark: append 1M widths through the background writer.
fn bench_append_background(c: &mut Criterion) {
    c.bench_function("append_1m_background", |b| {
        b.iter(|| {
            let store = BackgroundStore::spawn(MemoryStore::new()).unwrap();
            let mut series = PagedSeries::new(store, 1 << 16).unwrap();
            for i in 0..N {
                series.append(i as f64).unwrap();
            }
            series.flush().unwrap();
            black_box(series.len())
        });
    });
}

/// Benchmark: strided reads that pull a page from disk on every access.
fn bench_strided_reads_file(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut series = PagedSeries::new(FileStore::new(dir.path()), 4096).unwrap();
    for i in 0..N {
        series.append(i as f64).unwrap();
    }
    series.flush().unwrap();

    c.bench_function("strided_reads_file", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for i in (0..N).step_by(4096 * 7) {
                acc += series.get(i).unwrap();
            }
            black_box(acc)
        });
    });
}

criterion_group!(
    benches,
    bench_append_memory,
    bench_append_background,
    bench_strided_reads_file
);
criterion_main!(benches);
