//! Gaussian (normal) point distribution
//!
//! Models requests clustering around a center, such as a downtown core.
//! Both axes are drawn independently from `N(center, stddev)`; the same
//! type backs each cluster of a composite model.
//!
//! # Parameters
//!
//! - **center**: `(x, y)` in meters
//! - **stddev**: Standard deviation in meters, shared by both axes
//!
//! A zero standard deviation is accepted and always yields the center.

use super::{Coordinate, PointDistribution};
use crate::error::SimError;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Independent normal draws around a center
#[derive(Debug, Clone)]
pub struct GaussianPoint {
    x: Normal<f64>,
    y: Normal<f64>,
}

impl GaussianPoint {
    /// Create a distribution centered at `(center_x, center_y)`
    pub fn new(center_x: f64, center_y: f64, stddev: f64) -> Result<Self, SimError> {
        let axis = |mean: f64| {
            Normal::new(mean, stddev).map_err(|e| {
                SimError::config(format!(
                    "invalid normal distribution (mean={}, stddev={}): {}",
                    mean, stddev, e
                ))
            })
        };
        Ok(Self {
            x: axis(center_x)?,
            y: axis(center_y)?,
        })
    }
}

impl PointDistribution for GaussianPoint {
    #[inline]
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        let x = self.x.sample(rng);
        let y = self.y.sample(rng);
        Coordinate::new(x, y)
    }
}
