use std::sync::Arc;

use crate::error::{InvalidInput, KendallTauError};

/// Two index-aligned sequences of equal length, with at least two elements.
///
/// The buffers are shared behind an `Arc`, so cloning a `Samples` is cheap and
/// every worker of a parallel computation reads the same data.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    x: Arc<[f64]>,
    y: Arc<[f64]>,
}

impl Samples {
    pub fn new(x: impl Into<Arc<[f64]>>, y: impl Into<Arc<[f64]>>) -> Result<Self, KendallTauError> {
        let x = x.into();
        let y = y.into();

        if x.len() != y.len() {
            return Err(InvalidInput::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            }
            .into());
        }
        if x.len() < 2 {
            return Err(InvalidInput::TooFewSamples(x.len()).into());
        }

        Ok(Self { x, y })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of samples, `n`. Always at least 2.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false, a `Samples` holds at least two elements.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Size of the outer index range, `n - 1`. The last sample has no pair with a larger index.
    pub fn outer_len(&self) -> usize {
        self.len() - 1
    }
}

/// Anything the engines can load their input sequences from.
pub trait SampleSource {
    /// Short description of where the data comes from, used in logs and errors.
    fn describe(&self) -> String;

    /// Loads both sequences. Should fail with `KendallTauError::DataUnavailable`
    /// if the data cannot be found or read.
    fn load(&self) -> Result<Samples, KendallTauError>;
}

/// A source that hands out samples that are already in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    samples: Samples,
}

impl InMemorySource {
    pub fn new(samples: Samples) -> Self {
        Self { samples }
    }
}

impl SampleSource for InMemorySource {
    fn describe(&self) -> String {
        format!("memory ({} samples)", self.samples.len())
    }

    fn load(&self) -> Result<Samples, KendallTauError> {
        Ok(self.samples.clone())
    }
}
