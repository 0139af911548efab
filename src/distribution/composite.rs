//! Composite (mixture) point distribution
//!
//! Models a region made of several towns with sparse traffic in between.
//!
//! # Sampling
//!
//! 1. With probability `fallback_weight`, draw uniformly over the whole area
//!    `[0, area_size]` (the "suburban" fallback).
//! 2. Otherwise pick one sub-region by weighted choice, using weights
//!    normalized among the sub-regions only, and draw from its Gaussian.
//!
//! With `fallback_weight = 0` the fallback branch is never taken; with
//! `fallback_weight = 1` it is always taken.

use super::gaussian::GaussianPoint;
use super::uniform::UniformPoint;
use super::{Coordinate, PointDistribution, Subregion};
use crate::error::SimError;
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

/// Weighted Gaussian clusters plus a uniform fallback
#[derive(Debug, Clone)]
pub struct CompositePoint {
    clusters: Vec<GaussianPoint>,
    /// `None` when no sub-region carries weight (fallback-only model)
    picker: Option<WeightedIndex<f64>>,
    fallback_weight: f64,
    fallback: UniformPoint,
}

impl CompositePoint {
    /// Build the mixture
    ///
    /// `normalized_weights` must line up with `subregions`.
    pub fn new(
        subregions: &[Subregion],
        normalized_weights: Vec<f64>,
        fallback_weight: f64,
        area_size: f64,
    ) -> Result<Self, SimError> {
        if subregions.len() != normalized_weights.len() {
            return Err(SimError::config(format!(
                "{} sub-regions but {} weights",
                subregions.len(),
                normalized_weights.len()
            )));
        }

        let clusters = subregions
            .iter()
            .map(|r| GaussianPoint::new(r.center.0, r.center.1, r.stddev))
            .collect::<Result<Vec<_>, _>>()?;

        let picker = if normalized_weights.iter().any(|w| *w > 0.0) {
            let index = WeightedIndex::new(normalized_weights)
                .map_err(|e| SimError::config(format!("invalid sub-region weights: {}", e)))?;
            Some(index)
        } else {
            None
        };

        if picker.is_none() && fallback_weight < 1.0 {
            return Err(SimError::config(
                "composite model has no weighted sub-region to pick from",
            ));
        }

        Ok(Self {
            clusters,
            picker,
            fallback_weight,
            fallback: UniformPoint::new(0.0, area_size)?,
        })
    }
}

impl PointDistribution for CompositePoint {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        let use_fallback = rng.gen::<f64>() < self.fallback_weight;
        match (&self.picker, use_fallback) {
            (Some(picker), false) => {
                let chosen = picker.sample(rng);
                self.clusters[chosen].draw(rng)
            }
            // Fallback drawn, or nothing weighted to pick from
            _ => self.fallback.draw(rng),
        }
    }
}
