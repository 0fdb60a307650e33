//! Randomised behaviour durations.
//!
//! Suspicion timings are drawn uniformly from an inclusive millisecond
//! range so the prop never peeks on a predictable rhythm.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive `[min_ms, max_ms]` range of durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DurationRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }

    /// Draw one duration from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(uniform_inclusive(rng, self.min_ms, self.max_ms))
    }
}

/// Uniform integer in `[min, max]`.  A reversed range is swapped rather
/// than rejected.
pub fn uniform_inclusive<R: Rng + ?Sized>(rng: &mut R, min: u64, max: u64) -> u64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.gen_range(lo..=hi)
}
