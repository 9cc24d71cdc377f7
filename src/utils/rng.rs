//! Random start values for trainable parameters.
//!
//! Layers draw their initial weights and bias through the [`Initializer`]
//! trait. [`SimpleRng`] is the default source: a lightweight xorshift PRNG that
//! gives reproducible values for a fixed seed. Tests can pass any
//! `FnMut() -> f64` closure instead to get exact, known parameters.

use std::time::{SystemTime, UNIX_EPOCH};

const FALLBACK_SEED: u64 = 0x9e3779b97f4a7c15;

/// Source of initial parameter values.
pub trait Initializer {
    /// Produce the next start value.
    fn next_value(&mut self) -> f64;
}

impl<F> Initializer for F
where
    F: FnMut() -> f64,
{
    fn next_value(&mut self) -> f64 {
        self()
    }
}

/// Xorshift generator for reproducible parameter initialization.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a new RNG with explicit seed (if zero, use a fixed value).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { FALLBACK_SEED } else { seed };
        Self { state }
    }

    /// Create an RNG seeded from the current time.
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        Self::new(nanos)
    }

    /// Basic xorshift to generate u32.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 32) as u32
    }

    /// Uniform sample in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Uniform sample in [low, high).
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }
}

impl Initializer for SimpleRng {
    /// Start values are uniform in [0, 1).
    fn next_value(&mut self) -> f64 {
        self.next_f64()
    }
}
