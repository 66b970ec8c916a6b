use std::{
    cmp::Ordering,
    iter::Sum,
    ops::{Add, AddAssign, Range},
    sync::atomic::{self, AtomicBool},
};

/// Concordant, discordant and excluded pair counts over some part of the pair index space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairCounts {
    pub concordant: u64,
    pub discordant: u64,
    /// Pairs with a zero difference in `x`, `y` or both. These count towards neither total.
    pub ties: u64,
}

impl PairCounts {
    /// Total number of pairs that were looked at.
    pub fn pairs(&self) -> u64 {
        self.concordant + self.discordant + self.ties
    }
}

impl Add for PairCounts {
    type Output = PairCounts;

    fn add(self, rhs: Self) -> Self::Output {
        PairCounts {
            concordant: self.concordant + rhs.concordant,
            discordant: self.discordant + rhs.discordant,
            ties: self.ties + rhs.ties,
        }
    }
}

impl AddAssign for PairCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for PairCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(PairCounts::default(), Add::add)
    }
}

/// How a single index pair contributes to the counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIs)]
pub enum PairClass {
    Concordant,
    Discordant,
    Tie,
}

/// Classifies the pair of differences `dx = x[i] - x[j]` and `dy = y[i] - y[j]`.
///
/// This compares signs instead of looking at `dx * dy`, which gives the same answer for
/// finite values but cannot underflow to zero. A NaN difference is treated like a tie.
pub fn classify(dx: f64, dy: f64) -> PairClass {
    match (dx.partial_cmp(&0.0), dy.partial_cmp(&0.0)) {
        (Some(Ordering::Greater), Some(Ordering::Greater))
        | (Some(Ordering::Less), Some(Ordering::Less)) => PairClass::Concordant,
        (Some(Ordering::Greater), Some(Ordering::Less))
        | (Some(Ordering::Less), Some(Ordering::Greater)) => PairClass::Discordant,
        _ => PairClass::Tie,
    }
}

/// Counts concordant and discordant pairs for a range of the outer index.
///
/// Implementations must cover every pair `(i, j)` with `i` in `outer` and `i < j < x.len()`,
/// and must not have side effects: a parallel computation calls them from several workers at once.
pub trait PairCounter: Send + Sync {
    fn count(&self, x: &[f64], y: &[f64], outer: Range<usize>) -> PairCounts;

    /// Like [`PairCounter::count`], but gives up with `None` once the flag is set.
    /// The default ignores the flag and always finishes.
    fn count_until(
        &self,
        x: &[f64],
        y: &[f64],
        outer: Range<usize>,
        _cancelled: &AtomicBool,
    ) -> Option<PairCounts> {
        Some(self.count(x, y, outer))
    }
}

/// The plain `O(k * n)` pairwise comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceCounter;

impl BruteForceCounter {
    fn count_outer(
        x: &[f64],
        y: &[f64],
        outer: Range<usize>,
        cancelled: Option<&AtomicBool>,
    ) -> Option<PairCounts> {
        debug_assert_eq!(x.len(), y.len());
        let n = x.len();
        let mut counts = PairCounts::default();

        for i in outer {
            if cancelled.is_some_and(|flag| flag.load(atomic::Ordering::Relaxed)) {
                return None;
            }
            let (xi, yi) = (x[i], y[i]);
            for j in i + 1..n {
                match classify(xi - x[j], yi - y[j]) {
                    PairClass::Concordant => counts.concordant += 1,
                    PairClass::Discordant => counts.discordant += 1,
                    PairClass::Tie => counts.ties += 1,
                }
            }
        }

        Some(counts)
    }
}

impl PairCounter for BruteForceCounter {
    fn count(&self, x: &[f64], y: &[f64], outer: Range<usize>) -> PairCounts {
        Self::count_outer(x, y, outer, None).unwrap_or_default()
    }

    /// Checks the flag once per outer index.
    fn count_until(
        &self,
        x: &[f64],
        y: &[f64],
        outer: Range<usize>,
        cancelled: &AtomicBool,
    ) -> Option<PairCounts> {
        Self::count_outer(x, y, outer, Some(cancelled))
    }
}
