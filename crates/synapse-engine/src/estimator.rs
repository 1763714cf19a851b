use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of every bounded draw the pipeline makes: severities, profit
/// estimates, multiplier bands and simulated signal readings.
///
/// Swapping the implementation changes the numbers, never the control flow.
pub trait Estimator: Send + Sync {
    /// A value in `[lo, hi]`. Returns `lo` when the range is empty.
    fn uniform(&self, lo: f64, hi: f64) -> f64;

    /// An integer in `[lo, hi]`. Returns `lo` when the range is empty.
    fn range_inclusive(&self, lo: u32, hi: u32) -> u32;
}

/// ChaCha8-backed estimator. Seeded instances replay the same sequence.
pub struct RandomEstimator {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomEstimator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl Estimator for RandomEstimator {
    fn uniform(&self, lo: f64, hi: f64) -> f64 {
        if lo.is_nan() || hi.is_nan() || lo >= hi {
            return lo;
        }
        // A panic while holding the lock cannot leave the RNG inconsistent.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(lo..=hi)
    }

    fn range_inclusive(&self, lo: u32, hi: u32) -> u32 {
        if lo >= hi {
            return lo;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(lo..=hi)
    }
}
