use std::{
    ops::Range,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use test_log::test;

use crate::{
    counter::{BruteForceCounter, PairCounter, PairCounts},
    error::{InvalidInput, KendallTauError},
    samples::Samples,
    sequential::SequentialEngine,
    settings::ParallelSettings,
    tau::total_pairs,
    Engine,
};

use super::ParallelEngine;

fn random_samples(rng: &mut ChaCha8Rng, n: usize, distinct_values: Option<u32>) -> Samples {
    let mut value = || match distinct_values {
        // Few distinct values means lots of ties.
        Some(distinct) => rng.gen_range(0..distinct) as f64,
        None => rng.gen::<f64>(),
    };
    let x: Vec<f64> = (0..n).map(|_| value()).collect();
    let y: Vec<f64> = (0..n).map(|_| value()).collect();
    Samples::new(x, y).unwrap()
}

/// Panics on the chunk that starts at `failing_start`.
struct FailingCounter {
    failing_start: usize,
}

impl PairCounter for FailingCounter {
    fn count(&self, x: &[f64], y: &[f64], outer: Range<usize>) -> PairCounts {
        if outer.start == self.failing_start {
            panic!("Out of memory while counting");
        }
        BruteForceCounter.count(x, y, outer)
    }
}

/// Sleeps before counting the chunk that starts at `stalling_start`.
struct StallingCounter {
    stalling_start: usize,
    stall: Duration,
}

impl PairCounter for StallingCounter {
    fn count(&self, x: &[f64], y: &[f64], outer: Range<usize>) -> PairCounts {
        if outer.start == self.stalling_start {
            std::thread::sleep(self.stall);
        }
        BruteForceCounter.count(x, y, outer)
    }
}

/// Waits on the chunk that starts at `stalling_start` until it is cancelled or `stall` has passed,
/// and records whether it saw the cancellation.
struct CancellableStall {
    stalling_start: usize,
    stall: Duration,
    saw_cancel: Arc<AtomicBool>,
}

impl PairCounter for CancellableStall {
    fn count(&self, x: &[f64], y: &[f64], outer: Range<usize>) -> PairCounts {
        BruteForceCounter.count(x, y, outer)
    }

    fn count_until(
        &self,
        x: &[f64],
        y: &[f64],
        outer: Range<usize>,
        cancelled: &AtomicBool,
    ) -> Option<PairCounts> {
        if outer.start == self.stalling_start {
            let started = Instant::now();
            while started.elapsed() < self.stall {
                if cancelled.load(Ordering::Relaxed) {
                    self.saw_cancel.store(true, Ordering::Relaxed);
                    return None;
                }
                std::thread::sleep(Duration::from_millis(5));
            }
        }
        BruteForceCounter.count_until(x, y, outer, cancelled)
    }
}

#[test]
fn matches_sequential_for_every_worker_count() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let sequential = SequentialEngine::new();

    for n in [2, 3, 5, 17, 64] {
        let samples = random_samples(&mut rng, n, None);
        let expected_counts = sequential.count(&samples).unwrap();
        let expected_tau = sequential.compute(&samples).unwrap();

        for worker_count in 1..n {
            let engine = ParallelEngine::new(ParallelSettings::with_workers(worker_count));
            let counts = engine.count(&samples).unwrap();
            assert_eq!(
                counts, expected_counts,
                "Counts differ for n = {} with {} workers",
                n, worker_count
            );
            let tau = engine.compute(&samples).unwrap();
            assert!((tau - expected_tau).abs() < 1e-12);
        }
    }
}

#[test]
fn matches_sequential_with_many_ties() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let sequential = SequentialEngine::new();

    for _ in 0..10 {
        let n = rng.gen_range(2..120);
        let samples = random_samples(&mut rng, n, Some(4));
        let worker_count = rng.gen_range(1..12);

        let expected = sequential.count(&samples).unwrap();
        let counts = ParallelEngine::new(ParallelSettings::with_workers(worker_count))
            .count(&samples)
            .unwrap();

        assert_eq!(counts, expected);
        assert_eq!(counts.pairs() as u128, total_pairs(n));
        assert!(((counts.concordant + counts.discordant) as u128) <= total_pairs(n));
    }
}

#[test]
fn more_workers_than_pairs() {
    let samples = Samples::new(vec![1.0, 2.0], vec![2.0, 1.0]).unwrap();
    let engine = ParallelEngine::new(ParallelSettings::with_workers(16));
    assert_eq!(engine.compute(&samples).unwrap(), -1.0);
}

#[test]
fn monotonic_sequences() {
    let x: Vec<f64> = (0..500).map(|i| (i as f64).sqrt()).collect();
    let negated: Vec<f64> = x.iter().map(|v| -v).collect();
    let engine = ParallelEngine::new(ParallelSettings::with_workers(7));

    let same = Samples::new(x.clone(), x.clone()).unwrap();
    assert_eq!(engine.compute(&same).unwrap(), 1.0);

    let opposite = Samples::new(x, negated).unwrap();
    assert_eq!(engine.compute(&opposite).unwrap(), -1.0);
}

#[test]
fn tied_example() {
    let samples = Samples::new(vec![1.0, 1.0, 2.0, 3.0], vec![1.0, 2.0, 1.0, 3.0]).unwrap();
    let engine = ParallelEngine::new(ParallelSettings::with_workers(2));

    let counts = engine.count(&samples).unwrap();
    assert_eq!(counts.concordant, 3);
    assert_eq!(counts.discordant, 1);
    assert_eq!(counts.ties, 2);
}

#[test]
fn zero_workers_is_invalid() {
    let samples = Samples::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
    let engine = ParallelEngine::new(ParallelSettings::with_workers(0));
    assert!(matches!(
        engine.compute(&samples),
        Err(KendallTauError::InvalidInput(InvalidInput::NoWorkers))
    ));
}

#[test]
fn worker_failure_names_the_chunk() {
    let x: Vec<f64> = (0..41).map(|i| i as f64).collect();
    let samples = Samples::new(x.clone(), x).unwrap();
    // 40 outer indices over 4 workers: [0, 10), [10, 20), [20, 30), [30, 40).
    let engine = ParallelEngine::with_counter(
        ParallelSettings::with_workers(4),
        FailingCounter { failing_start: 20 },
    );

    match engine.compute(&samples) {
        Err(KendallTauError::WorkerFailure { chunk, message, .. }) => {
            assert_eq!(chunk.index, 2);
            assert_eq!(chunk.range(), 20..30);
            assert!(message.contains("Out of memory"));
        }
        other => panic!("Expected a worker failure, got {:?}", other),
    }
}

#[test]
fn stalled_chunk_times_out() {
    let x: Vec<f64> = (0..31).map(|i| i as f64).collect();
    let samples = Samples::new(x.clone(), x).unwrap();
    let settings = ParallelSettings {
        worker_count: 3,
        chunk_timeout: Some(500),
    };
    let engine = ParallelEngine::with_counter(
        settings,
        StallingCounter {
            stalling_start: 10,
            stall: Duration::from_secs(3),
        },
    );

    match engine.compute(&samples) {
        Err(KendallTauError::WorkerTimeout {
            chunk,
            worker,
            timeout,
        }) => {
            assert_eq!(chunk.range(), 10..20);
            assert_eq!(worker, 1);
            assert_eq!(timeout, Duration::from_millis(500));
        }
        other => panic!("Expected a timeout, got {:?}", other),
    }
}

#[test]
fn timed_out_chunk_is_cancelled() {
    let x: Vec<f64> = (0..31).map(|i| i as f64).collect();
    let samples = Samples::new(x.clone(), x).unwrap();
    let saw_cancel = Arc::new(AtomicBool::new(false));
    let settings = ParallelSettings {
        worker_count: 3,
        chunk_timeout: Some(100),
    };
    let engine = ParallelEngine::with_counter(
        settings,
        CancellableStall {
            stalling_start: 10,
            stall: Duration::from_secs(30),
            saw_cancel: Arc::clone(&saw_cancel),
        },
    );

    let started = Instant::now();
    assert!(matches!(
        engine.compute(&samples),
        Err(KendallTauError::WorkerTimeout { .. })
    ));

    // The stalled worker notices the flag long before its stall would have ended.
    while !saw_cancel.load(Ordering::Relaxed) && started.elapsed() < Duration::from_secs(10) {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(saw_cancel.load(Ordering::Relaxed));
}

#[test]
fn failed_chunk_cancels_the_others() {
    let x: Vec<f64> = (0..41).map(|i| i as f64).collect();
    let samples = Samples::new(x.clone(), x).unwrap();
    let saw_cancel = Arc::new(AtomicBool::new(false));

    struct FailThenStall {
        failing: FailingCounter,
        stalling: CancellableStall,
    }

    impl PairCounter for FailThenStall {
        fn count(&self, x: &[f64], y: &[f64], outer: Range<usize>) -> PairCounts {
            BruteForceCounter.count(x, y, outer)
        }

        fn count_until(
            &self,
            x: &[f64],
            y: &[f64],
            outer: Range<usize>,
            cancelled: &AtomicBool,
        ) -> Option<PairCounts> {
            if outer.start == self.failing.failing_start {
                return Some(self.failing.count(x, y, outer));
            }
            self.stalling.count_until(x, y, outer, cancelled)
        }
    }

    let engine = ParallelEngine::with_counter(
        ParallelSettings::with_workers(4),
        FailThenStall {
            failing: FailingCounter { failing_start: 0 },
            stalling: CancellableStall {
                stalling_start: 30,
                stall: Duration::from_secs(30),
                saw_cancel: Arc::clone(&saw_cancel),
            },
        },
    );

    let started = Instant::now();
    assert!(matches!(
        engine.compute(&samples),
        Err(KendallTauError::WorkerFailure { .. })
    ));

    while !saw_cancel.load(Ordering::Relaxed) && started.elapsed() < Duration::from_secs(10) {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(saw_cancel.load(Ordering::Relaxed));
}

#[test]
fn timeout_not_hit_when_chunks_are_fast() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let samples = random_samples(&mut rng, 50, None);
    let settings = ParallelSettings {
        worker_count: 4,
        chunk_timeout: Some(60_000),
    };

    let expected = SequentialEngine::new().compute(&samples).unwrap();
    let tau = ParallelEngine::new(settings).compute(&samples).unwrap();
    assert!((tau - expected).abs() < 1e-12);
}

#[test]
fn run_reports_worker_count() {
    let samples = Samples::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
    let result = ParallelEngine::new(ParallelSettings::with_workers(2))
        .run(&samples)
        .unwrap();
    assert_eq!(result.strategy, crate::Strategy::Parallel { workers: 2 });
    assert_eq!(result.tau, 1.0);
}

#[test]
fn default_uses_available_cores() {
    let engine = ParallelEngine::default();
    assert!(engine.settings().worker_count >= 1);
    assert_eq!(engine.settings().chunk_timeout, None);
}
