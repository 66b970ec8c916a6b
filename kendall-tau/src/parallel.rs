use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use crossbeam_channel::{RecvTimeoutError, Sender};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{
    counter::{BruteForceCounter, PairCounter, PairCounts},
    error::KendallTauError,
    partition::{partition, Chunk},
    result::Strategy,
    samples::Samples,
    settings::ParallelSettings,
    Engine,
};

/// Splits the outer index into contiguous chunks and counts every chunk on its own worker thread.
///
/// Every call to `count` builds a fresh pool with one thread per chunk, and tears it down before
/// returning. No state is kept between computations.
///
/// When a chunk fails or times out, the remaining chunks are cancelled through a flag shared with
/// the workers. Dropping the pool does not wait for them: a counter that honours the flag (as
/// [`BruteForceCounter`] does, once per outer index) stops shortly after, while one that ignores
/// it keeps its thread busy until the chunk is done.
#[derive(Debug, Clone)]
pub struct ParallelEngine<C = BruteForceCounter> {
    settings: ParallelSettings,
    counter: Arc<C>,
}

impl ParallelEngine {
    pub fn new(settings: ParallelSettings) -> Self {
        Self::with_counter(settings, BruteForceCounter)
    }
}

impl Default for ParallelEngine {
    fn default() -> Self {
        Self::new(ParallelSettings::default())
    }
}

/// What a worker sends back to the orchestrating thread once its chunk is done.
struct ChunkOutcome {
    chunk: Chunk,
    worker: Option<usize>,
    counts: Result<PairCounts, String>,
}

impl<C> ParallelEngine<C>
where
    C: PairCounter + 'static,
{
    pub fn with_counter(settings: ParallelSettings, counter: C) -> Self {
        Self {
            settings,
            counter: Arc::new(counter),
        }
    }

    pub fn settings(&self) -> &ParallelSettings {
        &self.settings
    }

    fn build_pool(&self, thread_count: usize) -> Result<ThreadPool, KendallTauError> {
        ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .thread_name(|i| format!("kendall-worker-{}", i))
            .build()
            .map_err(|err| KendallTauError::WorkerPool(err.to_string()))
    }

    fn dispatch(
        &self,
        pool: &ThreadPool,
        chunk: Chunk,
        samples: &Samples,
        cancelled: &Arc<AtomicBool>,
        sender: Sender<ChunkOutcome>,
    ) {
        let samples = samples.clone();
        let counter = Arc::clone(&self.counter);
        let cancelled = Arc::clone(cancelled);

        log::debug!("Dispatching chunk {} {}", chunk.index, chunk);
        pool.spawn(move || {
            let worker = rayon::current_thread_index();
            let counts = match panic::catch_unwind(AssertUnwindSafe(|| {
                counter.count_until(samples.x(), samples.y(), chunk.range(), &cancelled)
            })) {
                Ok(Some(counts)) => Ok(counts),
                Ok(None) => {
                    log::debug!("Chunk {} {} cancelled", chunk.index, chunk);
                    return;
                }
                Err(payload) => Err(panic_message(payload.as_ref())),
            };

            // The receiver is gone if the computation already failed, so there is nobody left to tell.
            if sender
                .send(ChunkOutcome {
                    chunk,
                    worker,
                    counts,
                })
                .is_err()
            {
                log::debug!("Result of chunk {} {} was not collected", chunk.index, chunk);
            }
        });
    }

    fn collect(
        &self,
        chunks: &[Chunk],
        receiver: crossbeam_channel::Receiver<ChunkOutcome>,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<PairCounts, KendallTauError> {
        let mut done = vec![false; chunks.len()];
        let mut total = PairCounts::default();

        for _ in 0..chunks.len() {
            let received = match deadline {
                Some((deadline, timeout)) => match receiver.recv_deadline(deadline) {
                    Ok(outcome) => outcome,
                    Err(RecvTimeoutError::Timeout) => {
                        let chunk = first_unfinished(chunks, &done);
                        log::warn!("Chunk {} {} timed out after {:?}", chunk.index, chunk, timeout);
                        return Err(KendallTauError::WorkerTimeout {
                            chunk,
                            // Every chunk has a thread of its own.
                            worker: chunk.index,
                            timeout,
                        });
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        return Err(lost_worker(first_unfinished(chunks, &done)))
                    }
                },
                None => match receiver.recv() {
                    Ok(outcome) => outcome,
                    Err(_) => return Err(lost_worker(first_unfinished(chunks, &done))),
                },
            };

            let ChunkOutcome {
                chunk,
                worker,
                counts,
            } = received;
            match counts {
                Ok(counts) => {
                    log::debug!(
                        "Chunk {} {} finished on worker {:?}: {:?}",
                        chunk.index,
                        chunk,
                        worker,
                        counts
                    );
                    done[chunk.index] = true;
                    total += counts;
                }
                Err(message) => {
                    log::error!("Chunk {} {} failed: {}", chunk.index, chunk, message);
                    return Err(KendallTauError::WorkerFailure {
                        chunk,
                        worker,
                        message,
                    });
                }
            }
        }

        Ok(total)
    }
}

impl<C> Engine for ParallelEngine<C>
where
    C: PairCounter + 'static,
{
    fn strategy(&self) -> Strategy {
        Strategy::Parallel {
            workers: self.settings.worker_count,
        }
    }

    fn count(&self, samples: &Samples) -> Result<PairCounts, KendallTauError> {
        let chunks = partition(samples.outer_len(), self.settings.worker_count)?;
        log::debug!(
            "Counting {} pairs with {} chunks over {} workers",
            samples.len(),
            chunks.len(),
            self.settings.worker_count
        );

        let pool = self.build_pool(chunks.len())?;
        let (sender, receiver) = crossbeam_channel::bounded(chunks.len());
        let cancelled = Arc::new(AtomicBool::new(false));

        let deadline = self
            .settings
            .chunk_timeout_duration()
            .map(|timeout| (Instant::now() + timeout, timeout));

        for chunk in chunks.iter() {
            self.dispatch(&pool, *chunk, samples, &cancelled, sender.clone());
        }
        // Only the workers hold senders now, so a worker that disappears disconnects the channel.
        drop(sender);

        let result = self.collect(&chunks, receiver, deadline);
        if result.is_err() {
            cancelled.store(true, Ordering::Relaxed);
        }

        // Does not wait for threads that are still busy, they exit once their chunk gives up.
        drop(pool);

        result
    }
}

fn first_unfinished(chunks: &[Chunk], done: &[bool]) -> Chunk {
    chunks
        .iter()
        .zip(done)
        .find(|(_, done)| !**done)
        .map(|(chunk, _)| *chunk)
        .unwrap_or(chunks[0])
}

fn lost_worker(chunk: Chunk) -> KendallTauError {
    log::error!("Worker for chunk {} {} exited without a result", chunk.index, chunk);
    KendallTauError::WorkerFailure {
        chunk,
        worker: None,
        message: "worker exited without reporting a result".to_string(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod test;
