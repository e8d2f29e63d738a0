//! Injectable randomness.
//!
//! Photo selection and every simulated success/failure draw through
//! [`RandomSource`], so tests can force outcomes and demos can be replayed
//! from a seed.

use std::ops::Range;
use std::sync::Mutex;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&self, len: usize) -> usize;

    /// Uniform float in `[0, 1)`.
    fn unit(&self) -> f64;

    /// `true` with probability `p`.
    fn chance(&self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform value in `range` (returns `range.start` for empty ranges).
    fn between_ms(&self, range: Range<u64>) -> u64 {
        if range.end <= range.start {
            return range.start;
        }
        let span = (range.end - range.start) as f64;
        range.start + (self.unit() * span) as u64
    }
}

/// Thread-local OS-seeded randomness.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible randomness from a fixed seed.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<Mcg128Xsl64>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(Mcg128Xsl64::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn index(&self, len: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..len),
            Err(_) => 0,
        }
    }

    fn unit(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen::<f64>(),
            Err(_) => 0.0,
        }
    }
}
