//! fastHubble Satellite Simulation
//!
//! Captures one grayscale frame per configuration:
//! - A producer streams random sensor readings into the ring buffer
//! - The receiver waits for `n²` readings and detaches them as one batch
//! - The processor sorts the batch in parallel and renders the frame
//!
//! Pass a JSON config file (`{"i": 8, "j": 3}`) as the first argument, or run
//! without arguments to sweep a small grid of sizes and cutoffs.
//! Set `RUST_LOG=debug` to follow every pipeline transition.

use fastHubble::prelude::*;
use std::env;

fn main() -> Result<(), SimulationError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    println!("{}", "=".repeat(80));
    println!("fastHubble Satellite Simulation");
    println!("{}", "=".repeat(80));
    println!();

    if let Some(path) = env::args().nth(1) {
        let config = SimulationConfig::from_path(path)?;
        return run_once(config);
    }

    for i in [4, 6, 8] {
        for j in [0, 1, 2, 3] {
            run_once(SimulationConfig::new(i, j)?)?;
        }
    }
    Ok(())
}

fn run_once(config: SimulationConfig) -> Result<(), SimulationError> {
    println!("i = {}, j = {}", config.i, config.j);
    println!("{}", "-".repeat(80));

    let report = Simulation::new(config)?.run()?;
    println!("{}", report);
    println!();
    Ok(())
}
