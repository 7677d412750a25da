//! Randomness port.
//!
//! Shuffling asks this port for a fresh generator per call, so production
//! uses OS entropy while tests inject a seeded source.

use rand::rngs::StdRng;

/// Source of random number generators.
pub trait RngSource: Send + Sync {
    /// A new generator, independent of any previously returned one.
    fn generator(&self) -> StdRng;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn RngSource) {}
}
