//! Simulation context implementing RandomSource for deterministic runs.

use collapse_env::{EnvError, RandomSource};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Simulation random source backed by a seeded ChaCha8 RNG.
///
/// Unlike the production source, every draw is counted so tests can assert
/// how much randomness a run consumed (e.g. that a single-candidate
/// tie-break consumes none).
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,

    /// Deterministic RNG
    rng: ChaCha8Rng,

    /// Number of sampling/shuffle calls served
    draws: u64,
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Returns how many random operations have been served.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for SimContext {
    fn uniform_int(&mut self, min: u32, max: u32) -> Result<u32, EnvError> {
        if min > max {
            return Err(EnvError::invalid_range(min, max));
        }
        self.draws += 1;
        Ok(self.rng.gen_range(min..=max))
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        self.draws += 1;
        items.shuffle(&mut self.rng);
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
