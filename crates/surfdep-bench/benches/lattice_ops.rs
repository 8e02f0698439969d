//! Criterion micro-benchmarks for lattice reads and buffer recycling.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use surfdep_lattice::RollingLattice;

/// Benchmark: occupancy lookups over a full 1024 x 512 buffer.
fn bench_is_occupied_sweep(c: &mut Criterion) {
    let mut lattice = RollingLattice::new(1024, 1 << 20, 512).unwrap();
    for x in (0..1024).step_by(3) {
        for y in 0..512 {
            lattice.occupy(x, y).unwrap();
        }
    }

    c.bench_function("is_occupied_sweep_512k", |b| {
        b.iter(|| {
            let mut n = 0u32;
            for y in 0..512i64 {
                for x in 0..1024usize {
                    n += u32::from(lattice.is_occupied(x, y).unwrap());
                }
            }
            black_box(n)
        });
    });
}

/// Benchmark: local maximum over every 3-column window of 4096 columns.
fn bench_local_max_height(c: &mut Criterion) {
    let mut lattice = RollingLattice::new(4096, 1 << 20, 64).unwrap();
    for x in 0..4096usize {
        let h = (x as u64).wrapping_mul(6364136223846793007) % 1000;
        lattice.set_height(x, h as i64).unwrap();
    }

    c.bench_function("local_max_height_4096", |b| {
        b.iter(|| {
            let mut acc = 0i64;
            for x in 0..4096i64 {
                acc += lattice.local_max_height(x - 1, x + 1);
            }
            black_box(acc)
        });
    });
}

/// Benchmark: a single column climbing 100K rows through a 256-row buffer.
fn bench_recycle_climb(c: &mut Criterion) {
    c.bench_function("recycle_climb_100k", |b| {
        b.iter(|| {
            let mut lattice = RollingLattice::new(256, 1 << 20, 256).unwrap();
            for y in 0..100_000i64 {
                black_box(lattice.recycle(y).unwrap());
                lattice.occupy(0, y).unwrap();
            }
            black_box(lattice.occupied_cells())
        });
    });
}

criterion_group!(
    benches,
    bench_is_occupied_sweep,
    bench_local_max_height,
    bench_recycle_climb
);
criterion_main!(benches);
