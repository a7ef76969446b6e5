//! hubble benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - Sort scalability (64K to 4M elements)
//! - Sort threshold sweep
//! - Input shapes (random, sorted, reversed, few distinct values)
//! - Ring buffer throughput (single adds, batched adds, takes)
//! - End-to-end pipeline batches
//!
//! For serial sorting, use `HUBBLE_BACKEND=serial cargo bench`.
//! For parallel sorting, use `HUBBLE_BACKEND=parallel cargo bench` (default).

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fastHubble::internals::engine::executor::sort_pass_parallel;
use fastHubble::prelude::*;
use hubble::internals::algorithms::merge_sort::{sort_pass_sequential, SortPassFn};
use rand::prelude::*;
use std::env;
use std::hint::black_box;

// ============================================================================
// Helper Functions
// ============================================================================

fn get_config() -> (bool, SortPassFn<i32>, &'static str) {
    match env::var("HUBBLE_BACKEND").ok().as_deref() {
        Some("serial") => (false, sort_pass_sequential::<i32>, "serial"),
        _ => (true, sort_pass_parallel::<i32>, "parallel"),
    }
}

// ============================================================================
// Data Generation with Reproducible RNG
// ============================================================================

/// Uniformly random `i32` readings, as the satellite produces them.
fn generate_random(size: usize, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.random()).collect()
}

/// Already sorted input.
fn generate_sorted(size: usize) -> Vec<i32> {
    (0..size as i32).collect()
}

/// Strictly decreasing input.
fn generate_reversed(size: usize) -> Vec<i32> {
    (0..size as i32).rev().collect()
}

/// Input with only a handful of distinct values.
fn generate_few_distinct(size: usize, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.random_range(0..8)).collect()
}

// ============================================================================
// Benchmark Functions
// ============================================================================

fn bench_scalability(c: &mut Criterion) {
    let (_, sort_pass, mode_name) = get_config();
    let mut group = c.benchmark_group(format!("scalability_{}", mode_name));
    group.sample_size(20);

    for size in [1 << 16, 1 << 18, 1 << 20, 1 << 22] {
        group.throughput(Throughput::Elements(size as u64));
        let data = generate_random(size, 42);

        group.bench_with_input(BenchmarkId::new("merge_sort", size), &size, |b, _| {
            b.iter_batched_ref(
                || data.clone(),
                |values| sort_pass(black_box(values), 64).unwrap(),
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_threshold(c: &mut Criterion) {
    let (_, sort_pass, mode_name) = get_config();
    let mut group = c.benchmark_group(format!("threshold_{}", mode_name));
    group.sample_size(20);

    let size = 1 << 20;
    group.throughput(Throughput::Elements(size as u64));
    let data = generate_random(size, 7);

    for threshold in [2, 8, 32, 128, 1024] {
        group.bench_with_input(
            BenchmarkId::new("merge_sort", threshold),
            &threshold,
            |b, &threshold| {
                b.iter_batched_ref(
                    || data.clone(),
                    |values| sort_pass(black_box(values), threshold).unwrap(),
                    criterion::BatchSize::LargeInput,
                )
            },
        );
    }
    group.finish();
}

fn bench_shapes(c: &mut Criterion) {
    let (_, sort_pass, mode_name) = get_config();
    let mut group = c.benchmark_group(format!("shapes_{}", mode_name));
    group.sample_size(20);

    let size = 1 << 20;
    group.throughput(Throughput::Elements(size as u64));
    let shapes = [
        ("random", generate_random(size, 3)),
        ("sorted", generate_sorted(size)),
        ("reversed", generate_reversed(size)),
        ("few_distinct", generate_few_distinct(size, 5)),
    ];

    for (name, data) in &shapes {
        group.bench_function(*name, |b| {
            b.iter_batched_ref(
                || data.clone(),
                |values| sort_pass(black_box(values), 64).unwrap(),
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_ring_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");
    let capacity = 1 << 16;
    group.throughput(Throughput::Elements(capacity as u64));
    let data = generate_random(capacity, 11);

    group.bench_function("add_then_take", |b| {
        let buffer = RingBuffer::new(capacity).unwrap();
        b.iter(|| {
            for &value in &data {
                buffer.add(black_box(value));
            }
            black_box(buffer.take(capacity))
        })
    });

    group.bench_function("add_all_then_take", |b| {
        let buffer = RingBuffer::new(capacity).unwrap();
        b.iter(|| {
            buffer.add_all(data.iter().copied(), true);
            black_box(buffer.take(capacity))
        })
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let (use_parallel, _, mode_name) = get_config();
    let mut group = c.benchmark_group(format!("pipeline_{}", mode_name));
    group.sample_size(10);

    for side_exponent in [6u32, 8, 10] {
        let threshold = 1usize << (2 * side_exponent);
        group.throughput(Throughput::Elements(threshold as u64));

        let pipeline = Pipeline::<i32>::new()
            .threshold(threshold)
            .sort_threshold(64)
            .parallel(use_parallel)
            .build()
            .unwrap();

        group.bench_with_input(
            BenchmarkId::new("one_frame", threshold),
            &threshold,
            |b, _| {
                b.iter(|| {
                    pipeline
                        .run(RandomSource::seeded(1), |sorted: &[i32]| sorted.len())
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_scalability,
    bench_threshold,
    bench_shapes,
    bench_ring_buffer,
    bench_pipeline,
);

criterion_main!(benches);
