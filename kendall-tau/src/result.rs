use std::time::Duration;

/// Which engine produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIs)]
pub enum Strategy {
    Sequential,
    Parallel { workers: usize },
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Parallel { workers } => write!(f, "parallel ({} workers)", workers),
        }
    }
}

/// The outcome of one timed run of an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunResult {
    pub strategy: Strategy,
    /// Number of samples, `n`.
    pub sample_count: usize,
    pub tau: f64,
    /// Wall-clock time of the computation, excluding data loading.
    pub elapsed: Duration,
}

impl RunResult {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// How many times faster this run was than `baseline`.
    pub fn speedup_over(&self, baseline: &RunResult) -> f64 {
        baseline.elapsed_seconds() / self.elapsed_seconds()
    }
}

impl std::fmt::Display for RunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} samples, tau = {:.4}, {:.2} seconds",
            self.strategy,
            self.sample_count,
            self.tau,
            self.elapsed_seconds()
        )
    }
}
