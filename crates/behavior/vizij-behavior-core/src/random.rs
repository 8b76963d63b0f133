//! Injectable sources of uniform random floats.
//!
//! All randomness in the engine (weighted selection, random durations) flows
//! through [`RandomSource`] so hosts and tests can make runs deterministic.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Source of uniform floats in `[0, 1)`.
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;

    /// Uniform draw in `[min, max]`. Reversed bounds are swapped.
    fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        lo + (hi - lo) * self.next_f32()
    }
}

/// Default source backed by PCG32.
#[derive(Clone, Debug)]
pub struct PcgRandom {
    rng: Pcg32,
}

impl PcgRandom {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl RandomSource for PcgRandom {
    #[inline]
    fn next_f32(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

/// Replays a fixed list of values, cycling when exhausted. Values are clamped
/// into `[0, 1)`. An empty script always yields 0.
#[derive(Clone, Debug, Default)]
pub struct SequenceRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        v.clamp(0.0, 1.0 - f32::EPSILON)
    }
}
