//! Kendall's rank correlation coefficient (tau-a) between two equal-length sequences,
//! computed by brute-force pair counting either on one thread or split across a pool of workers.
//!
//! Pairs with a zero difference in either sequence are excluded from both the concordant
//! and discordant counts, but still count towards the total number of pairs. With ties in the
//! data the result is therefore biased towards zero, and differs from the tie-corrected tau-b.

use std::time::Instant;

mod error;

pub mod counter;
pub mod parallel;
pub mod partition;
pub mod result;
pub mod samples;
pub mod sequential;
pub mod settings;
pub mod tau;

pub use counter::{BruteForceCounter, PairCounter, PairCounts};
pub use error::{InvalidInput, KendallTauError};
pub use parallel::ParallelEngine;
pub use result::{RunResult, Strategy};
pub use samples::{SampleSource, Samples};
pub use sequential::SequentialEngine;
pub use settings::ParallelSettings;

/// A way of counting all concordant and discordant pairs of a set of samples.
pub trait Engine {
    fn strategy(&self) -> Strategy;

    /// Aggregated counts over the whole pair index space.
    fn count(&self, samples: &Samples) -> Result<PairCounts, KendallTauError>;

    fn compute(&self, samples: &Samples) -> Result<f64, KendallTauError> {
        let counts = self.count(samples)?;
        tau::tau(counts, samples.len())
    }

    fn compute_from<S>(&self, source: &S) -> Result<f64, KendallTauError>
    where
        S: SampleSource + ?Sized,
        Self: Sized,
    {
        log::debug!("Loading samples from {}", source.describe());
        let samples = source.load()?;
        self.compute(&samples)
    }

    /// Computes tau and measures how long that took.
    fn run(&self, samples: &Samples) -> Result<RunResult, KendallTauError> {
        let start_time = Instant::now();
        let tau = self.compute(samples)?;
        let elapsed = start_time.elapsed();

        let result = RunResult {
            strategy: self.strategy(),
            sample_count: samples.len(),
            tau,
            elapsed,
        };
        log::info!("{}", result);
        Ok(result)
    }
}

/// Computes tau sequentially.
pub fn kendall_tau(x: &[f64], y: &[f64]) -> Result<f64, KendallTauError> {
    SequentialEngine::new().compute(&Samples::new(x, y)?)
}

/// Computes tau with `worker_count` workers.
pub fn parallel_kendall_tau(
    x: &[f64],
    y: &[f64],
    worker_count: usize,
) -> Result<f64, KendallTauError> {
    ParallelEngine::new(ParallelSettings::with_workers(worker_count)).compute(&Samples::new(x, y)?)
}
