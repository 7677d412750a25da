//! Random generator sources.
//!
//! - `EntropyRngSource` seeds every generator from the OS
//! - `SeededRngSource` derives a reproducible sequence of generators from one
//!   seed, for tests and replayable environments

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::RngSource;

/// Generators seeded from operating system entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyRngSource;

impl EntropyRngSource {
    pub fn new() -> Self {
        Self
    }
}

impl RngSource for EntropyRngSource {
    fn generator(&self) -> StdRng {
        StdRng::from_os_rng()
    }
}

/// Deterministic generators: the n-th call is seeded with `seed + n`.
#[derive(Debug)]
pub struct SeededRngSource {
    seed: u64,
    calls: AtomicU64,
}

impl SeededRngSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            calls: AtomicU64::new(0),
        }
    }
}

impl RngSource for SeededRngSource {
    fn generator(&self) -> StdRng {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        StdRng::seed_from_u64(self.seed.wrapping_add(n))
    }
}
