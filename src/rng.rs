//! Injectable entropy source for widening and predicate refinement.
//!
//! The original analysis samples `rand()` directly during widening, which
//! makes runs non-reproducible. Here the random source is a trait object
//! threaded through the engine so tests can pin a seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait EntropySource {
    fn sample(&mut self) -> f64;
}

pub struct SeededEntropy(StdRng);

impl SeededEntropy {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl EntropySource for SeededEntropy {
    fn sample(&mut self) -> f64 {
        self.0.gen_range(0.0..1.0)
    }
}

/// Deterministic source that always returns a fixed value; useful in tests
/// that want to pin down the exact entropy blend without touching a PRNG.
pub struct FixedEntropy(pub f64);

impl EntropySource for FixedEntropy {
    fn sample(&mut self) -> f64 {
        self.0
    }
}
