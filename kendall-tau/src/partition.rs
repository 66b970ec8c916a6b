use std::ops::Range;

use crate::error::{InvalidInput, KendallTauError};

/// A contiguous range `[start, end)` of the outer index, dispatched to one worker.
/// An outer index `i` covers all pairs `(i, j)` with `j > i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the partition.
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Splits `[0, outer_len)` into at most `worker_count` contiguous, non-empty chunks.
///
/// With `count = min(worker_count, outer_len)` chunks, the first `outer_len % count`
/// chunks get one index more than the rest. The chunks are ordered, disjoint and
/// together cover the whole range exactly once.
pub fn partition(outer_len: usize, worker_count: usize) -> Result<Vec<Chunk>, KendallTauError> {
    if worker_count == 0 {
        return Err(InvalidInput::NoWorkers.into());
    }

    let count = worker_count.min(outer_len);
    if count == 0 {
        return Ok(Vec::new());
    }

    let base = outer_len / count;
    let remainder = outer_len % count;

    let mut chunks = Vec::with_capacity(count);
    let mut start = 0;
    for index in 0..count {
        let size = if index < remainder { base + 1 } else { base };
        chunks.push(Chunk {
            index,
            start,
            end: start + size,
        });
        start += size;
    }
    debug_assert_eq!(start, outer_len);

    Ok(chunks)
}
