//! Production implementation of RandomSource using `StdRng`.

use crate::error::EnvError;
use crate::random::RandomSource;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Production random source backed by `StdRng`.
///
/// This is the "real" implementation used by the CLI when no seed is given.
/// The seed is still drawn up front and kept, so any production run can be
/// replayed by passing the logged seed back in.
pub struct StdRandom {
    /// Seed used to initialize the generator
    seed: u64,

    rng: StdRng,
}

impl StdRandom {
    /// Creates a source seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_seed(rand::random::<u64>())
    }

    /// Creates a deterministic source from a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for StdRandom {
    fn uniform_int(&mut self, min: u32, max: u32) -> Result<u32, EnvError> {
        if min > max {
            return Err(EnvError::invalid_range(min, max));
        }
        Ok(self.rng.gen_range(min..=max))
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
