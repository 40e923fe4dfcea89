//! Random source trait consumed by the collapse core.

use crate::error::EnvError;

/// The central interface for randomness.
///
/// This trait abstracts the random number generator so the collapse engine
/// can run both seeded (simulation, tests) and entropy-seeded (production)
/// without touching global state.
///
/// # Implementations
///
/// - **Production**: `StdRandom` - wraps `StdRng`, seeded from OS entropy or a `u64`
/// - **Simulation**: `SimContext` - wraps `ChaCha8Rng(seed)` and counts draws
///
/// # Determinism
///
/// Two sources built from the same seed must produce the same sequence of
/// samples and permutations.
pub trait RandomSource {
    /// Returns a uniformly distributed integer in `[min, max]`, both inclusive.
    ///
    /// `min == max` is a valid degenerate range and returns `min`.
    ///
    /// # Errors
    /// * `EnvError::InvalidRange` - `min > max`
    fn uniform_int(&mut self, min: u32, max: u32) -> Result<u32, EnvError>;

    /// Applies an unbiased in-place permutation to `items`.
    fn shuffle<T>(&mut self, items: &mut [T]);

    /// Returns the seed this source was built from (for logging/reproduction).
    fn seed(&self) -> u64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform_int(&mut self, min: u32, max: u32) -> Result<u32, EnvError> {
        (**self).uniform_int(min, max)
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        (**self).shuffle(items)
    }

    fn seed(&self) -> u64 {
        (**self).seed()
    }
}
