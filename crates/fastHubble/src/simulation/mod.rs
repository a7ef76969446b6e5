//! Layer 6: Simulation
//!
//! ## Purpose
//!
//! This layer drives a complete satellite run: a producer streams random
//! sensor readings into the ring buffer, the receiver detaches one frame's
//! worth of readings, and the processor sorts them in parallel and renders a
//! [`GrayscaleFrame`].
//!
//! ## Design notes
//!
//! * **Configuration**: Sizes derive from two exponents read from JSON.
//! * **Delegation**: Threads, buffering and sorting come from the `hubble`
//!   pipeline; this layer only configures it and shapes the output.
//!
//! ## Non-goals
//!
//! * Encoding frames into an image file format or transmitting them.

// Simulation parameters.
pub mod config;

// Frame rendering.
pub mod frame;

// External dependencies
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use thiserror::Error;
use tracing::info;

// Export dependencies from hubble crate
use hubble::internals::pipeline::producer::RandomSource;
use hubble::internals::pipeline::receiver::ReceiveMode;
use hubble::internals::primitives::errors::HubbleError;

// Internal dependencies
use crate::api::ParallelPipelineBuilder;
use config::SimulationConfig;
use frame::GrayscaleFrame;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for simulation runs.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The configuration is outside the supported range.
    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),

    /// The configuration document could not be parsed.
    #[error("Failed to parse simulation config: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("Failed to read simulation config: {0}")]
    Io(#[from] std::io::Error),

    /// The pipeline failed.
    #[error("Pipeline failed: {0}")]
    Pipeline(#[from] HubbleError),
}

// ============================================================================
// Simulation
// ============================================================================

/// Outcome of one satellite run.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// The configuration that produced this report.
    pub config: SimulationConfig,

    /// Wall-clock time from start until every thread was joined.
    pub elapsed: Duration,

    /// Readings the producer added to the buffer.
    pub produced: usize,

    /// The rendered frame.
    pub frame: GrayscaleFrame,
}

impl Display for SimulationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Side:           2^{} = {}", self.config.i, self.config.side())?;
        writeln!(f, "  Sort threshold: {}", self.config.sort_threshold())?;
        writeln!(f, "  Parallel:       {}", self.config.parallel)?;
        writeln!(f, "  Produced:       {}", self.produced)?;
        writeln!(f, "  Frame:          {}", self.frame)?;
        write!(f, "  Elapsed:        {:.3?}", self.elapsed)
    }
}

/// A configured satellite run.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    /// Validate `config` and prepare a run.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The run's configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Capture a single frame and stop every thread.
    pub fn run(&self) -> Result<SimulationReport, SimulationError> {
        let config = self.config;
        info!(
            side = config.side(),
            threshold = config.threshold(),
            sort_threshold = config.sort_threshold(),
            parallel = config.parallel,
            "starting satellite simulation"
        );

        let pipeline = ParallelPipelineBuilder::<i32>::new()
            .capacity(config.capacity())
            .threshold(config.threshold())
            .sort_threshold(config.sort_threshold())
            .mode(ReceiveMode::OneShot)
            .parallel(config.parallel)
            .build()?;

        let source = match config.seed {
            Some(seed) => RandomSource::seeded(seed),
            None => RandomSource::new(),
        };
        let side = config.side();
        let report = pipeline.run(source, move |sorted: &[i32]| {
            GrayscaleFrame::from_columns(side, sorted)
        })?;

        let frame = report
            .outputs
            .into_iter()
            .next()
            .ok_or(HubbleError::Interrupted)??;

        info!(
            produced = report.produced,
            elapsed = ?report.elapsed,
            "satellite simulation finished"
        );
        Ok(SimulationReport {
            config,
            elapsed: report.elapsed,
            produced: report.produced,
            frame,
        })
    }
}
