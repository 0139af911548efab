//! Coordinate sampler
//!
//! Owns the random generator and turns a model into concrete request
//! coordinates: base draw, then per-axis jitter uniform in
//! `[-jitter, jitter]`, then clamping into `[0, area_size - 1]`.
//!
//! Each sampler owns its own xoshiro256++ generator. Nothing global is
//! touched, so samplers seeded from per-run sub-seeds can run on any thread
//! without making results depend on scheduling.

use super::{Coordinate, PointDistribution, PreparedModel, SpatialModel};
use crate::error::SimError;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Draws jittered, clamped request coordinates
#[derive(Debug, Clone)]
pub struct CoordinateSampler {
    rng: Xoshiro256PlusPlus,
    area_size: f64,
    jitter: Uniform<f64>,
}

impl CoordinateSampler {
    /// Create a sampler seeded from OS entropy
    pub fn new(area_size: f64, jitter: f64) -> Result<Self, SimError> {
        Self::from_rng(Xoshiro256PlusPlus::from_entropy(), area_size, jitter)
    }

    /// Create a sampler with a specific seed
    ///
    /// Useful for reproducible tests.
    pub fn with_seed(area_size: f64, jitter: f64, seed: u64) -> Result<Self, SimError> {
        Self::from_rng(Xoshiro256PlusPlus::seed_from_u64(seed), area_size, jitter)
    }

    fn from_rng(rng: Xoshiro256PlusPlus, area_size: f64, jitter: f64) -> Result<Self, SimError> {
        if !area_size.is_finite() || area_size < 1.0 {
            return Err(SimError::config(format!(
                "area size must be at least 1 meter, got {}",
                area_size
            )));
        }
        // The jitter span is 2 * jitter wide and must stay finite
        if !(2.0 * jitter).is_finite() || jitter < 0.0 {
            return Err(SimError::config(format!(
                "jitter strength must be non-negative and finite, got {}",
                jitter
            )));
        }
        Ok(Self {
            rng,
            area_size,
            jitter: Uniform::new_inclusive(-jitter, jitter),
        })
    }

    /// Sample one request coordinate from `model`
    ///
    /// Fails with a configuration error if the model is malformed. Callers
    /// drawing many points should [`SpatialModel::prepare`] once and use
    /// [`sample_prepared`](Self::sample_prepared).
    pub fn sample(&mut self, model: &SpatialModel) -> Result<Coordinate, SimError> {
        let prepared = model.prepare(self.area_size)?;
        Ok(self.sample_prepared(&prepared))
    }

    /// Draw the base point only, before jitter and clamping
    pub fn sample_base(&mut self, model: &SpatialModel) -> Result<Coordinate, SimError> {
        let prepared = model.prepare(self.area_size)?;
        Ok(prepared.draw(&mut self.rng))
    }

    /// Sample one request coordinate from an already prepared model
    #[inline]
    pub fn sample_prepared(&mut self, model: &PreparedModel) -> Coordinate {
        let base = model.draw(&mut self.rng);
        self.finish(base)
    }

    /// Apply jitter and clamp into `[0, area_size - 1]`
    #[inline]
    fn finish(&mut self, base: Coordinate) -> Coordinate {
        let x = base.x + self.jitter.sample(&mut self.rng);
        let y = base.y + self.jitter.sample(&mut self.rng);
        let upper = self.area_size - 1.0;
        Coordinate::new(x.clamp(0.0, upper), y.clamp(0.0, upper))
    }

    /// Draw `count` coordinates, e.g. illustrative points for a report
    pub fn sample_many(
        &mut self,
        model: &SpatialModel,
        count: usize,
    ) -> Result<Vec<Coordinate>, SimError> {
        let prepared = model.prepare(self.area_size)?;
        Ok((0..count).map(|_| self.sample_prepared(&prepared)).collect())
    }

    /// Mutable access to the generator, for drawing request timestamps
    pub(crate) fn rng_mut(&mut self) -> &mut Xoshiro256PlusPlus {
        &mut self.rng
    }
}
