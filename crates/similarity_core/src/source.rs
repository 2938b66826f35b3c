use anyhow::Result;
use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::model::{base_similarity, DEFAULT_PERTURBATION};

/// Produces one similarity reading per tick.
///
/// A backend-driven implementation would await the next streamed value here;
/// the bundled one synthesises it. Returned values may fall outside `[0, 100]`,
/// the controller clamps them.
#[async_trait]
pub trait SimilaritySource: Send {
    async fn measure(&mut self, elapsed_secs: f64) -> Result<f64>;
}

/// Base curve plus a uniform perturbation in `[-amplitude, +amplitude]`.
pub struct SyntheticSource<R: Rng + Send = StdRng> {
    rng: R,
    amplitude: f64,
}

impl<R: Rng + Send> SyntheticSource<R> {
    pub fn new(rng: R, amplitude: f64) -> Self {
        Self {
            rng,
            amplitude: amplitude.abs(),
        }
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    fn perturbation(&mut self) -> f64 {
        if self.amplitude == 0.0 || !self.amplitude.is_finite() {
            return 0.0;
        }
        self.rng.gen_range(-self.amplitude..=self.amplitude)
    }
}

impl SyntheticSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), DEFAULT_PERTURBATION)
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy(), DEFAULT_PERTURBATION)
    }

    /// Exact base curve, no randomness.
    pub fn flat() -> Self {
        Self::new(StdRng::seed_from_u64(0), 0.0)
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude.abs();
        self
    }
}

#[async_trait]
impl<R: Rng + Send> SimilaritySource for SyntheticSource<R> {
    async fn measure(&mut self, elapsed_secs: f64) -> Result<f64> {
        Ok(base_similarity(elapsed_secs) + self.perturbation())
    }
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
