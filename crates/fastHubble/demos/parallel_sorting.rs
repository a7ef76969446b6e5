//! fastHubble Parallel Sorting Examples
//!
//! This example demonstrates features specific to `fastHubble`:
//! - Parallel threshold merge sort using `rayon`
//! - A sorter with a dedicated thread pool
//! - `ndarray` integration
//! - Parallel versus sequential pipelines

use fastHubble::prelude::*;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

fn main() -> Result<(), HubbleError> {
    println!("{}", "=".repeat(80));
    println!("fastHubble Parallel Sorting Examples");
    println!("{}", "=".repeat(80));
    println!();

    example_1_threshold_sweep()?;
    example_2_dedicated_pool()?;
    example_3_ndarray_integration()?;
    example_4_pipeline_comparison()?;

    Ok(())
}

fn random_values(n: usize) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| rng.random()).collect()
}

/// Example 1: Threshold Sweep
/// Shows how the cutoff trades recursion depth for quadratic work
fn example_1_threshold_sweep() -> Result<(), HubbleError> {
    println!("Example 1: Threshold Sweep");
    println!("{}", "-".repeat(80));

    let data = random_values(1 << 20);
    for threshold in [2, 16, 64, 256] {
        let sorter = ParallelSorter::new(threshold)?;
        let mut values = data.clone();

        let start = Instant::now();
        sorter.sort(&mut values)?;
        println!("threshold {:>4}: {:?}", threshold, start.elapsed());
    }

    println!();
    Ok(())
}

/// Example 2: Dedicated Pool
/// Limits the sort to a fixed number of worker threads
fn example_2_dedicated_pool() -> Result<(), HubbleError> {
    println!("Example 2: Dedicated Pool");
    println!("{}", "-".repeat(80));

    let data = random_values(1 << 18);
    for threads in [1, 2, 4] {
        let sorter = ParallelSorter::with_threads(32, threads)?;
        let mut values = data.clone();

        let start = Instant::now();
        sorter.sort(&mut values)?;
        println!("{} thread(s): {:?}", sorter.threads(), start.elapsed());
    }

    println!();
    Ok(())
}

/// Example 3: ndarray Integration
/// Sorts an `Array1` in place without copying
fn example_3_ndarray_integration() -> Result<(), HubbleError> {
    println!("Example 3: ndarray Integration");
    println!("{}", "-".repeat(80));

    let mut readings = Array1::from_vec(random_values(10_000));
    ParallelSorter::new(32)?.sort(&mut readings)?;

    println!("min = {}, max = {}", readings[0], readings[readings.len() - 1]);
    println!("sorted = {}", is_sorted_by(readings.as_slice().unwrap_or(&[]), i32::cmp));

    println!();
    Ok(())
}

/// Example 4: Pipeline Comparison
/// Runs the same seeded pipeline with both sort passes
fn example_4_pipeline_comparison() -> Result<(), HubbleError> {
    println!("Example 4: Pipeline Comparison");
    println!("{}", "-".repeat(80));

    for parallel in [false, true] {
        let report = Pipeline::new()
            .threshold(1 << 16)
            .sort_threshold(64)
            .mode(Repeat(4))
            .parallel(parallel)
            .build()?
            .run(RandomSource::seeded(7), |sorted: &[i32]| sorted.len())?;

        println!("parallel = {}", parallel);
        println!("{}", report);
    }

    println!();
    Ok(())
}
