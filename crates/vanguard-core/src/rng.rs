//! Injected randomness.
//!
//! Every random draw in the core goes through [`RandomSource`], so a battle
//! is reproducible from its seed ([`SeededRandom`]) and scenario tests can
//! pin exact outcomes ([`FixedRandom`]).

use std::collections::VecDeque;
use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of the three kinds of draws the core needs.
pub trait RandomSource {
    /// A float in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// An integer in `[low, high]`, both ends inclusive.
    fn integer(&mut self, low: i64, high: i64) -> i64;

    /// An index in `[0, len)`. Callers never pass zero.
    fn choice(&mut self, len: usize) -> usize;
}

// =============================================================================
// SeededRandom
// =============================================================================

/// Deterministic ChaCha8-backed source.
#[derive(Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a source seeded from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed this source was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRandom").field("seed", &self.seed).finish()
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn integer(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn choice(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

// =============================================================================
// FixedRandom
// =============================================================================

/// Scripted source for tests.
///
/// `uniform` pops queued values and falls back to `0.5`; `integer` returns
/// the low end; `choice` returns `0`.
#[derive(Debug, Clone, Default)]
pub struct FixedRandom {
    uniforms: VecDeque<f64>,
}

impl FixedRandom {
    /// Default draw once the queue is exhausted.
    pub const DEFAULT_UNIFORM: f64 = 0.5;

    /// Creates a stub with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stub that returns `values` from `uniform` in order.
    #[must_use]
    pub fn with_uniforms(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            uniforms: values.into_iter().collect(),
        }
    }

    /// Queues one more `uniform` value.
    pub fn push_uniform(&mut self, value: f64) {
        self.uniforms.push_back(value);
    }
}

impl RandomSource for FixedRandom {
    fn uniform(&mut self) -> f64 {
        self.uniforms.pop_front().unwrap_or(Self::DEFAULT_UNIFORM)
    }

    fn integer(&mut self, low: i64, _high: i64) -> i64 {
        low
    }

    fn choice(&mut self, _len: usize) -> usize {
        0
    }
}
