use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::{Mutex, PoisonError};

/// Shared random source for query rotation, page selection and shuffles.
///
/// Constructed once and injected; tests seed it to pin selections.
pub struct RandomSource {
    rng: Mutex<StdRng>,
}

impl RandomSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Uniform Fisher-Yates permutation in place
    pub fn shuffle<T>(&self, items: &mut [T]) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        items.shuffle(&mut *rng);
    }

    pub fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        items.choose(&mut *rng)
    }

    pub fn in_range(&self, range: RangeInclusive<u32>) -> u32 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(range)
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}
