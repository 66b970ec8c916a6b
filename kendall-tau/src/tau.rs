use crate::{
    counter::PairCounts,
    error::{InvalidInput, KendallTauError},
};

/// Number of unordered index pairs for `n` samples, `n(n-1)/2`.
///
/// Widened to `u128` so the product cannot overflow for any `usize`.
pub fn total_pairs(n: usize) -> u128 {
    let n = n as u128;
    n * n.saturating_sub(1) / 2
}

/// Tau-a from aggregated counts: `(concordant - discordant) / total_pairs`.
///
/// Tied pairs are left out of both counts but still part of `total_pairs`,
/// so the magnitude shrinks towards zero as the fraction of ties grows.
/// This is not the tie-corrected tau-b.
pub fn tau(counts: PairCounts, n: usize) -> Result<f64, KendallTauError> {
    if n < 2 {
        return Err(InvalidInput::TooFewSamples(n).into());
    }

    let total = total_pairs(n);
    debug_assert!((counts.concordant + counts.discordant) as u128 <= total);

    let difference = counts.concordant as i128 - counts.discordant as i128;
    Ok(difference as f64 / total as f64)
}
