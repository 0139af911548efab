//! Built-in models, densities and scenarios
//!
//! These reproduce the reference setup: a 5 km square, 100 m cells, a
//! three-day cache window, and four request layouts ranging from a tight
//! downtown to a Tuscany-like region of three towns.

use super::{NamedModel, Scenario};
use crate::distribution::{SpatialModel, Subregion};

/// Densities 100, 500, ..., 4900 requests
pub fn default_densities() -> Vec<u64> {
    (100..=5000).step_by(400).collect()
}

pub fn default_models() -> Vec<NamedModel> {
    vec![
        NamedModel::new("Urban", SpatialModel::Gaussian { mean: 2500.0, stddev: 400.0 }),
        NamedModel::new("Suburban", SpatialModel::Uniform { min: 0.0, max: 5000.0 }),
        NamedModel::new("Downtown", SpatialModel::Gaussian { mean: 2500.0, stddev: 150.0 }),
        NamedModel::new("Tuscany", tuscany()),
    ]
}

fn tuscany() -> SpatialModel {
    SpatialModel::Composite {
        subregions: vec![
            Subregion::new("Florence", (1500.0, 1500.0), 300.0, 0.4),
            Subregion::new("Pisa", (4000.0, 3500.0), 250.0, 0.25),
            Subregion::new("Lucca", (1000.0, 3000.0), 200.0, 0.15),
        ],
        fallback_weight: 0.2,
    }
}

pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("Urban (City)", "Downtown", 5000),
        Scenario::new("Mid-Density", "Urban", 2500),
        Scenario::new("Rural", "Suburban", 500),
        Scenario::new("Tuscany Region", "Tuscany", 3000),
    ]
}
