//! Spatial distribution models
//!
//! This module describes *where* simulated requests originate. A model is a
//! closed, declarative description ([`SpatialModel`]); before sampling it is
//! validated and compiled into a [`PreparedModel`] holding ready-to-use
//! `rand_distr` distributions. The [`sampler::CoordinateSampler`] then draws
//! base points from the prepared model and applies jitter and clamping.
//!
//! # Models
//!
//! - **Gaussian**: Normal distribution around `mean` on both axes (city center)
//! - **Uniform**: Flat distribution over `[min, max]` on both axes (suburbs)
//! - **Composite**: Weighted mixture of Gaussian clusters plus a uniform
//!   fallback over the whole area (a region with several towns)
//!
//! # Example
//!
//! ```
//! use geocache_sim::distribution::{SpatialModel, sampler::CoordinateSampler};
//!
//! let model = SpatialModel::Gaussian { mean: 2500.0, stddev: 400.0 };
//! let mut sampler = CoordinateSampler::with_seed(5000.0, 50.0, 42).unwrap();
//! let point = sampler.sample(&model).unwrap();
//! assert!(point.x >= 0.0 && point.x <= 4999.0);
//! ```

pub mod composite;
pub mod gaussian;
pub mod sampler;
pub mod uniform;

use crate::error::SimError;
use composite::CompositePoint;
use gaussian::GaussianPoint;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uniform::UniformPoint;

/// A point in the simulated area, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A localized cluster inside a composite model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subregion {
    /// Display name (e.g. a town)
    #[serde(default)]
    pub name: String,
    /// Cluster center in meters
    pub center: (f64, f64),
    /// Standard deviation on both axes, in meters
    pub stddev: f64,
    /// Relative weight among sub-regions (normalized before use)
    pub weight: f64,
}

impl Subregion {
    pub fn new(name: impl Into<String>, center: (f64, f64), stddev: f64, weight: f64) -> Self {
        Self { name: name.into(), center, stddev, weight }
    }
}

/// Declarative description of where requests originate
///
/// The `type` tag selects the variant when the model is read from TOML:
///
/// ```toml
/// type = "composite"
/// fallback_weight = 0.2
/// subregions = [{ name = "Florence", center = [1500.0, 1500.0], stddev = 300.0, weight = 0.4 }]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpatialModel {
    /// Independent normal draws on each axis
    Gaussian { mean: f64, stddev: f64 },
    /// Independent uniform draws on each axis, `[min, max]`
    Uniform { min: f64, max: f64 },
    /// Weighted clusters plus a uniform fallback over the full area
    Composite {
        subregions: Vec<Subregion>,
        /// Probability of drawing from the full-area fallback
        #[serde(default)]
        fallback_weight: f64,
    },
}

impl SpatialModel {
    /// Short tag name, matching the serialized `type`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gaussian { .. } => "gaussian",
            Self::Uniform { .. } => "uniform",
            Self::Composite { .. } => "composite",
        }
    }

    /// Check model parameters
    ///
    /// All values must be finite, standard deviations and weights
    /// non-negative, `min <= max`, and `fallback_weight` a probability. A
    /// composite model that can pick a sub-region (fallback below 1) needs
    /// a positive total sub-region weight.
    pub fn validate(&self) -> Result<(), SimError> {
        match self {
            Self::Gaussian { mean, stddev } => {
                check_finite("gaussian mean", *mean)?;
                check_stddev("gaussian", *stddev)?;
            }
            Self::Uniform { min, max } => {
                check_finite("uniform min", *min)?;
                check_finite("uniform max", *max)?;
                if min > max {
                    return Err(SimError::config(format!(
                        "uniform min ({}) must not exceed max ({})",
                        min, max
                    )));
                }
                if !(max - min).is_finite() {
                    return Err(SimError::config(format!(
                        "uniform range [{}, {}] is too wide",
                        min, max
                    )));
                }
            }
            Self::Composite { subregions, fallback_weight } => {
                check_finite("composite fallback_weight", *fallback_weight)?;
                if !(0.0..=1.0).contains(fallback_weight) {
                    return Err(SimError::config(format!(
                        "composite fallback_weight must be between 0.0 and 1.0, got {}",
                        fallback_weight
                    )));
                }
                for (i, region) in subregions.iter().enumerate() {
                    let label = if region.name.is_empty() {
                        format!("subregion {}", i)
                    } else {
                        format!("subregion '{}'", region.name)
                    };
                    check_finite(&format!("{} center x", label), region.center.0)?;
                    check_finite(&format!("{} center y", label), region.center.1)?;
                    check_stddev(&label, region.stddev)?;
                    check_finite(&format!("{} weight", label), region.weight)?;
                    if region.weight < 0.0 {
                        return Err(SimError::config(format!(
                            "{} has negative weight {}",
                            label, region.weight
                        )));
                    }
                }
                let total: f64 = subregions.iter().map(|r| r.weight).sum();
                if !total.is_finite() {
                    return Err(SimError::config("composite sub-region weights overflow"));
                }
                if *fallback_weight < 1.0 && total <= 0.0 {
                    return Err(SimError::config(
                        "composite model needs at least one sub-region with positive weight \
                         unless fallback_weight is 1.0",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Sub-region weights normalized to sum to 1 (empty for other variants)
    pub fn normalized_weights(&self) -> Vec<f64> {
        match self {
            Self::Composite { subregions, .. } => {
                let total: f64 = subregions.iter().map(|r| r.weight).sum();
                if total <= 0.0 {
                    return vec![0.0; subregions.len()];
                }
                subregions.iter().map(|r| r.weight / total).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Validate and compile into ready-to-sample distributions
    ///
    /// `area_size` bounds the composite model's uniform fallback.
    pub fn prepare(&self, area_size: f64) -> Result<PreparedModel, SimError> {
        self.validate()?;
        let prepared = match self {
            Self::Gaussian { mean, stddev } => {
                PreparedModel::Gaussian(GaussianPoint::new(*mean, *mean, *stddev)?)
            }
            Self::Uniform { min, max } => PreparedModel::Uniform(UniformPoint::new(*min, *max)?),
            Self::Composite { subregions, fallback_weight } => {
                PreparedModel::Composite(CompositePoint::new(
                    subregions,
                    self.normalized_weights(),
                    *fallback_weight,
                    area_size,
                )?)
            }
        };
        Ok(prepared)
    }
}

impl fmt::Display for SpatialModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gaussian { mean, stddev } => {
                write!(f, "gaussian(mean={}, stddev={})", mean, stddev)
            }
            Self::Uniform { min, max } => write!(f, "uniform({}..{})", min, max),
            Self::Composite { subregions, fallback_weight } => write!(
                f,
                "composite({} sub-regions, fallback={})",
                subregions.len(),
                fallback_weight
            ),
        }
    }
}

fn check_finite(what: &str, value: f64) -> Result<(), SimError> {
    if !value.is_finite() {
        return Err(SimError::config(format!("{} must be finite, got {}", what, value)));
    }
    Ok(())
}

fn check_stddev(what: &str, stddev: f64) -> Result<(), SimError> {
    check_finite(&format!("{} stddev", what), stddev)?;
    if stddev < 0.0 {
        return Err(SimError::config(format!(
            "{} stddev must be non-negative, got {}",
            what, stddev
        )));
    }
    Ok(())
}

/// Draws a base (pre-jitter, unclamped) point
///
/// Implementations are built once per aggregate call and shared read-only
/// by every run; all randomness comes from the caller's generator.
pub trait PointDistribution: Send + Sync {
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate;
}

/// A validated model compiled into concrete distributions
#[derive(Debug, Clone)]
pub enum PreparedModel {
    Gaussian(GaussianPoint),
    Uniform(UniformPoint),
    Composite(CompositePoint),
}

impl PointDistribution for PreparedModel {
    #[inline]
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        match self {
            Self::Gaussian(g) => g.draw(rng),
            Self::Uniform(u) => u.draw(rng),
            Self::Composite(c) => c.draw(rng),
        }
    }
}
