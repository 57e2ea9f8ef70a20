use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform noise source for fallback signal paths.
///
/// Degraded signals sample a bounded band instead of returning a constant
/// so that fallback-only responses still produce distinguishable rankings.
/// Seedable so tests can pin exact values.
#[derive(Debug)]
pub struct NoiseSource {
    rng: Mutex<StdRng>,
}

impl NoiseSource {
    /// Noise source seeded from the OS.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic noise source.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Samples uniformly from `[lo, hi)`.
    pub fn uniform(&self, lo: f64, hi: f64) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(lo..hi)
    }
}
