//! Criterion benchmarks for level chains and the growth pool.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use polycube_bench::{pool_profile, seed_profile};
use polycube_core::Key;
use polycube_engine::GrowthPool;
use polycube_grow::LevelChain;

/// Benchmark: one chain from the base case to size 7.
fn bench_chain_to_seven(c: &mut Criterion) {
    let mut chain = LevelChain::new(2, 7);

    c.bench_function("chain_base_to_7", |b| {
        b.iter(|| {
            chain.load(&[Key::base()]);
            black_box(chain.drain(|_| {}));
        });
    });
}

/// Benchmark: pool growth from pentacubes to size 8 at several thread
/// counts.
fn bench_pool_threads(c: &mut Criterion) {
    let seeds = seed_profile(5);
    let mut group = c.benchmark_group("pool_5_to_8");
    group.sample_size(10);

    for threads in [1, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &t| {
            b.iter(|| {
                let out = GrowthPool::new(pool_profile(5, 8, t))
                    .unwrap()
                    .with_seeds(seeds.clone())
                    .unwrap()
                    .run()
                    .unwrap();
                black_box(out.report.total);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_chain_to_seven, bench_pool_threads);
criterion_main!(benches);
