use std::{num::NonZeroUsize, time::Duration};

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct ParallelSettings {
    /// The number of workers, and so the number of chunks the outer index is split into.
    /// Must be at least 1. If there are fewer outer indices than workers, only as many
    /// workers as there are outer indices are started.
    pub worker_count: usize,
    /// The time in milliseconds a single chunk may take before the computation fails
    /// with a worker timeout. `None` waits forever.
    pub chunk_timeout: Option<u128>,
}

impl ParallelSettings {
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Default::default()
        }
    }

    pub fn chunk_timeout_duration(&self) -> Option<Duration> {
        self.chunk_timeout
            .map(|millis| Duration::from_millis(millis.min(u64::MAX as u128) as u64))
    }
}

impl Default for ParallelSettings {
    fn default() -> Self {
        Self {
            worker_count: available_workers(),
            chunk_timeout: None,
        }
    }
}

/// The number of logical cores reported by the platform, or 1 if that is unknown.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
