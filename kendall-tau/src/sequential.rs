use crate::{
    counter::{BruteForceCounter, PairCounter, PairCounts},
    error::KendallTauError,
    result::Strategy,
    samples::Samples,
    Engine,
};

/// Counts all pairs with a single call to the counter on the calling thread.
#[derive(Debug, Clone, Default)]
pub struct SequentialEngine<C = BruteForceCounter> {
    counter: C,
}

impl SequentialEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C> SequentialEngine<C>
where
    C: PairCounter,
{
    pub fn with_counter(counter: C) -> Self {
        Self { counter }
    }
}

impl<C> Engine for SequentialEngine<C>
where
    C: PairCounter,
{
    fn strategy(&self) -> Strategy {
        Strategy::Sequential
    }

    fn count(&self, samples: &Samples) -> Result<PairCounts, KendallTauError> {
        log::debug!("Counting {} pairs sequentially", samples.len());
        Ok(self
            .counter
            .count(samples.x(), samples.y(), 0..samples.outer_len()))
    }
}
