//! geocache-sim - Monte-Carlo estimator for geographic API caches
//!
//! Estimates how often a grid-keyed, time-windowed cache in front of an
//! external geographic API would serve a request instead of forwarding it.
//! Request coordinates are drawn from a spatial model, snapped to a square
//! grid, and checked against per-cell timestamp histories.
//!
//! # Architecture
//!
//! - **Spatial models**: Gaussian, uniform and composite multi-cluster
//!   ([`distribution`])
//! - **Grid**: maps coordinates to cells ([`grid`])
//! - **Simulator**: runs and aggregates Monte-Carlo runs in parallel
//!   ([`simulator`], [`stats`])
//! - **Sweeps**: model × density studies and named scenarios ([`sweep`])
//! - **Reports**: text, JSON and CSV ([`output`])

pub mod config;
pub mod distribution;
pub mod error;
pub mod grid;
pub mod output;
pub mod simulator;
pub mod stats;
pub mod sweep;

// Re-export commonly used types
pub use config::Config;
pub use distribution::{Coordinate, SpatialModel, Subregion};
pub use error::SimError;
pub use grid::{Grid, GridCell};
pub use simulator::{SimulationParams, Simulator};
pub use stats::aggregator::AggregateResult;

/// Result type used by the configuration and reporting layers
pub type Result<T> = anyhow::Result<T>;
