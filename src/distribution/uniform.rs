//! Uniform point distribution
//!
//! Every location in `[min, max]` on each axis is equally likely. This
//! models evenly spread suburban traffic and is also the composite
//! model's full-area fallback.

use super::{Coordinate, PointDistribution};
use crate::error::SimError;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Uniform draws over a square `[min, max] x [min, max]`
#[derive(Debug, Clone)]
pub struct UniformPoint {
    axis: Uniform<f64>,
}

impl UniformPoint {
    /// Create a uniform distribution over `[min, max]` on both axes
    ///
    /// `min == max` is allowed and always yields that value.
    pub fn new(min: f64, max: f64) -> Result<Self, SimError> {
        // The span must be representable too, or rand panics on range overflow
        if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
            return Err(SimError::config(format!(
                "invalid uniform range [{}, {}]",
                min, max
            )));
        }
        Ok(Self {
            axis: Uniform::new_inclusive(min, max),
        })
    }
}

impl PointDistribution for UniformPoint {
    #[inline(always)]
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        let x = self.axis.sample(rng);
        let y = self.axis.sample(rng);
        Coordinate::new(x, y)
    }
}
