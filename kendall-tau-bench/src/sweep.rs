use std::ops::RangeInclusive;

use kendall_tau::{Engine, KendallTauError, ParallelEngine, ParallelSettings, RunResult, Samples};

use crate::settings::SweepSettings;

/// The worker counts to try: `min_workers` up to `max_workers`, but never more than `available`.
/// Empty if the cap falls below `min_workers`.
pub(crate) fn worker_counts(settings: &SweepSettings, available: usize) -> RangeInclusive<usize> {
    let min = settings.min_workers.max(1);
    let max = settings.max_workers.min(available);
    min..=max
}

/// Runs the parallel engine once per worker count. The first failing run aborts the sweep.
pub(crate) fn run_sweep(
    samples: &Samples,
    worker_counts: RangeInclusive<usize>,
    chunk_timeout: Option<u128>,
) -> Result<Vec<RunResult>, KendallTauError> {
    let mut results = Vec::new();
    for worker_count in worker_counts {
        log::info!("Using {} workers...", worker_count);
        let engine = ParallelEngine::new(ParallelSettings {
            worker_count,
            chunk_timeout,
        });
        results.push(engine.run(samples)?);
    }
    Ok(results)
}

/// Logs how much faster every parallel run was than the sequential baseline,
/// next to the ideal linear speedup.
pub(crate) fn log_speedups(baseline: &RunResult, results: &[RunResult]) {
    log::info!("Workers\tSpeedup\tIdeal");
    for result in results {
        if let kendall_tau::Strategy::Parallel { workers } = result.strategy {
            log::info!(
                "{}\t{:.2}\t{}",
                workers,
                result.speedup_over(baseline),
                workers
            );
        }
    }
}
