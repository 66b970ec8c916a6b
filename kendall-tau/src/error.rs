use std::time::Duration;

use crate::partition::Chunk;

#[derive(Debug)]
pub enum KendallTauError {
    /// The input sequences could not be located or loaded.
    DataUnavailable {
        source: String,
        reason: String,
    },
    InvalidInput(InvalidInput),
    /// A parallel work unit terminated abnormally.
    WorkerFailure {
        chunk: Chunk,
        worker: Option<usize>,
        message: String,
    },
    /// A parallel work unit did not finish within the configured chunk timeout.
    WorkerTimeout {
        chunk: Chunk,
        worker: usize,
        timeout: Duration,
    },
    /// The worker pool itself could not be created.
    WorkerPool(String),
}

impl std::fmt::Display for KendallTauError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KendallTauError::DataUnavailable { source, reason } => write!(
                f,
                "Data unavailable from {}: {}. Generate or provide the data first",
                source, reason
            ),
            KendallTauError::InvalidInput(err) => write!(f, "Invalid input: {}", err),
            KendallTauError::WorkerFailure {
                chunk,
                worker,
                message,
            } => match worker {
                Some(worker) => write!(
                    f,
                    "Worker {} failed on chunk {} {}: {}",
                    worker, chunk.index, chunk, message
                ),
                None => write!(f, "Worker failed on chunk {} {}: {}", chunk.index, chunk, message),
            },
            KendallTauError::WorkerTimeout {
                chunk,
                worker,
                timeout,
            } => write!(
                f,
                "Worker {} timed out after {:?} on chunk {} {}",
                worker, timeout, chunk.index, chunk
            ),
            KendallTauError::WorkerPool(message) => {
                write!(f, "Could not create worker pool: {}", message)
            }
        }
    }
}

impl std::error::Error for KendallTauError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidInput {
    LengthMismatch { x_len: usize, y_len: usize },
    TooFewSamples(usize),
    NoWorkers,
    /// The noise standard deviation for generated data is negative or not finite.
    InvalidNoise(f64),
}

impl std::fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidInput::LengthMismatch { x_len, y_len } => {
                write!(f, "sequence lengths differ (x: {}, y: {})", x_len, y_len)
            }
            InvalidInput::TooFewSamples(n) => {
                write!(f, "at least 2 samples are required, got {}", n)
            }
            InvalidInput::NoWorkers => write!(f, "worker count must be at least 1"),
            InvalidInput::InvalidNoise(std_dev) => write!(
                f,
                "noise standard deviation must be finite and not negative, got {}",
                std_dev
            ),
        }
    }
}

impl From<InvalidInput> for KendallTauError {
    fn from(val: InvalidInput) -> Self {
        KendallTauError::InvalidInput(val)
    }
}
