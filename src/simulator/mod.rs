//! Monte-Carlo cache-hit simulator
//!
//! [`Simulator::aggregate`] answers one question: for `num_requests` requests
//! spread according to a model, with a cache entry valid for `ttl`, what
//! fraction of requests is served from cache? It executes `num_runs`
//! independent runs (see [`window::simulate_run`]) and averages them with a
//! [`RunAggregator`].
//!
//! # Determinism and parallelism
//!
//! Each call picks a base seed (the configured one, or fresh entropy) and
//! gives run `i` its own generator seeded with [`derive_seed`]`(base, i)`.
//! Runs share nothing, so they execute on a rayon pool and still produce
//! bit-identical results for a fixed seed whatever the thread count.
//!
//! # Cancellation
//!
//! An optional flag is checked before each run starts, never inside a run.
//! A cancelled call returns [`SimError::Cancelled`] instead of a partial
//! aggregate.

pub mod window;

use crate::distribution::sampler::CoordinateSampler;
use crate::distribution::{Coordinate, SpatialModel};
use crate::error::SimError;
use crate::grid::Grid;
use crate::stats::aggregator::{AggregateResult, RunAggregator};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Geometry and defaults shared by every aggregate call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParams {
    /// Edge length of a grid cell in meters
    pub cell_size: f64,
    /// Edge length of the square area in meters
    pub area_size: f64,
    /// Cache validity window, in simulated minutes
    pub ttl: u64,
    /// Jitter strength in meters
    pub jitter: f64,
    /// Smoothing runs per aggregate call
    pub runs: usize,
    /// Base seed; `None` draws fresh entropy for every call
    pub seed: Option<u64>,
    /// Worker threads for parallel runs (0 = one per CPU)
    pub threads: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            cell_size: 100.0,
            area_size: 5000.0,
            ttl: 3 * 24 * 60,
            jitter: 50.0,
            runs: 5,
            seed: None,
            threads: 0,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), SimError> {
        Grid::new(self.cell_size, self.area_size)?;
        validate_ttl(self.ttl)?;
        validate_runs(self.runs)?;
        if !(2.0 * self.jitter).is_finite() || self.jitter < 0.0 {
            return Err(SimError::config(format!(
                "jitter strength must be non-negative and finite, got {}",
                self.jitter
            )));
        }
        Ok(())
    }

    /// Thread count with 0 resolved to the number of CPUs
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

fn validate_ttl(ttl: u64) -> Result<(), SimError> {
    if ttl == 0 {
        return Err(SimError::config("ttl must be positive"));
    }
    Ok(())
}

fn validate_runs(runs: usize) -> Result<(), SimError> {
    if runs == 0 {
        return Err(SimError::config("number of runs must be at least 1"));
    }
    Ok(())
}

/// Mix a base seed with a stream index (SplitMix64 finalizer)
///
/// Nearby inputs map to unrelated outputs, so per-run and per-configuration
/// sub-seeds do not produce correlated generator streams.
pub fn derive_seed(base: u64, stream: u64) -> u64 {
    let mut z = base
        .wrapping_add(stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Entry point of the simulation core
pub struct Simulator {
    params: SimulationParams,
    grid: Grid,
    pool: rayon::ThreadPool,
    cancel: Option<Arc<AtomicBool>>,
}

impl Simulator {
    /// Create a simulator after validating `params`
    pub fn new(params: SimulationParams) -> Result<Self, SimError> {
        params.validate()?;
        let grid = Grid::new(params.cell_size, params.area_size)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.effective_threads())
            .thread_name(|i| format!("geocache-run-{}", i))
            .build()
            .map_err(|e| SimError::config(format!("failed to build thread pool: {}", e)))?;

        Ok(Self {
            params,
            grid,
            pool,
            cancel: None,
        })
    }

    /// Attach a cancellation flag, checked between runs
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Run `num_runs` simulations and average them
    ///
    /// Uses the configured seed, or fresh entropy when none is set.
    pub fn aggregate(
        &self,
        num_requests: u64,
        model: &SpatialModel,
        ttl: u64,
        num_runs: usize,
    ) -> Result<AggregateResult, SimError> {
        let base_seed = self.params.seed.unwrap_or_else(rand::random);
        self.aggregate_seeded(num_requests, model, ttl, num_runs, base_seed)
    }

    /// [`aggregate`](Self::aggregate) with the configured TTL and run count
    pub fn run_density(
        &self,
        num_requests: u64,
        model: &SpatialModel,
    ) -> Result<AggregateResult, SimError> {
        self.aggregate(num_requests, model, self.params.ttl, self.params.runs)
    }

    /// [`aggregate`](Self::aggregate) with an explicit base seed
    pub fn aggregate_seeded(
        &self,
        num_requests: u64,
        model: &SpatialModel,
        ttl: u64,
        num_runs: usize,
        base_seed: u64,
    ) -> Result<AggregateResult, SimError> {
        validate_ttl(ttl)?;
        validate_runs(num_runs)?;
        let prepared = model.prepare(self.params.area_size)?;

        if num_requests == 0 {
            warn!(model = %model, "zero requests requested, returning an empty result");
        }

        debug!(
            num_requests,
            ttl,
            num_runs,
            base_seed,
            model = %model,
            "starting aggregate"
        );

        let completed = AtomicUsize::new(0);
        let results = self.pool.install(|| {
            (0..num_runs)
                .into_par_iter()
                .map(|run_index| {
                    if self.is_cancelled() {
                        return Err(SimError::Cancelled {
                            completed_runs: completed.load(Ordering::SeqCst),
                        });
                    }
                    let mut sampler = CoordinateSampler::with_seed(
                        self.params.area_size,
                        self.params.jitter,
                        derive_seed(base_seed, run_index as u64),
                    )?;
                    let result = window::simulate_run(
                        num_requests,
                        &prepared,
                        &self.grid,
                        ttl,
                        &mut sampler,
                    );
                    completed.fetch_add(1, Ordering::SeqCst);
                    Ok((run_index, result))
                })
                .collect::<Result<Vec<_>, SimError>>()
        })?;

        let mut aggregator = RunAggregator::new();
        for (run_index, result) in results {
            aggregator.add_run(run_index, result);
        }
        let aggregate = aggregator.aggregate().clone();

        debug!(
            hit_rate = aggregate.average_hit_rate,
            total_hits = aggregate.total_hits,
            total_misses = aggregate.total_misses,
            cells = aggregate.per_cell_average_hits.len(),
            "aggregate complete"
        );

        Ok(aggregate)
    }

    /// Draw illustrative points from `model` without simulating
    ///
    /// `stream` selects an independent generator stream under a fixed seed.
    pub fn sample_points(
        &self,
        model: &SpatialModel,
        count: usize,
        stream: u64,
    ) -> Result<Vec<Coordinate>, SimError> {
        let mut sampler = self.sampler(stream)?;
        sampler.sample_many(model, count)
    }

    /// A sampler configured with this simulator's area and jitter
    pub fn sampler(&self, stream: u64) -> Result<CoordinateSampler, SimError> {
        match self.params.seed {
            Some(seed) => CoordinateSampler::with_seed(
                self.params.area_size,
                self.params.jitter,
                derive_seed(seed ^ 0x5A4D_504C_4553, stream),
            ),
            None => CoordinateSampler::new(self.params.area_size, self.params.jitter),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::SeqCst))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(seed: u64) -> SimulationParams {
        SimulationParams {
            seed: Some(seed),
            threads: 2,
            ..SimulationParams::default()
        }
    }

    fn uniform() -> SpatialModel {
        SpatialModel::Uniform { min: 0.0, max: 5000.0 }
    }

    #[test]
    fn test_default_params_match_reference_setup() {
        let p = SimulationParams::default();
        assert_eq!(p.cell_size, 100.0);
        assert_eq!(p.area_size, 5000.0);
        assert_eq!(p.ttl, 4320);
        assert_eq!(p.jitter, 50.0);
        assert_eq!(p.runs, 5);
        assert!(p.validate().is_ok());
        assert!(p.effective_threads() >= 1);
    }

    #[test]
    fn test_params_validation() {
        let bad = [
            SimulationParams { ttl: 0, ..SimulationParams::default() },
            SimulationParams { runs: 0, ..SimulationParams::default() },
            SimulationParams { cell_size: 0.0, ..SimulationParams::default() },
            SimulationParams { area_size: -5.0, ..SimulationParams::default() },
            SimulationParams { jitter: -1.0, ..SimulationParams::default() },
            SimulationParams { jitter: f64::MAX, ..SimulationParams::default() },
        ];
        for p in bad {
            assert!(p.validate().unwrap_err().is_configuration(), "{:?}", p);
            assert!(Simulator::new(p).is_err());
        }
    }

    #[test]
    fn test_derive_seed_spreads_streams() {
        assert_ne!(derive_seed(1, 0), derive_seed(1, 1));
        assert_ne!(derive_seed(1, 0), derive_seed(2, 0));
        assert_eq!(derive_seed(42, 7), derive_seed(42, 7));
    }

    #[test]
    fn test_aggregate_zero_requests() {
        let sim = Simulator::new(params(1)).unwrap();
        let result = sim.aggregate(0, &uniform(), 4320, 5).unwrap();
        assert_eq!(result.average_hit_rate, 0.0);
        assert_eq!(result.total_hits, 0);
        assert_eq!(result.total_misses, 0);
        assert!(result.per_cell_average_hits.is_empty());
    }

    #[test]
    fn test_aggregate_rejects_bad_arguments() {
        let sim = Simulator::new(params(1)).unwrap();
        assert!(sim.aggregate(10, &uniform(), 0, 5).unwrap_err().is_configuration());
        assert!(sim.aggregate(10, &uniform(), 10, 0).unwrap_err().is_configuration());
        let bad_model = SpatialModel::Uniform { min: 10.0, max: 0.0 };
        assert!(sim.aggregate(10, &bad_model, 10, 1).unwrap_err().is_configuration());
    }

    #[test]
    fn test_aggregate_counts_all_requests() {
        let sim = Simulator::new(params(3)).unwrap();
        let result = sim.aggregate(500, &uniform(), 4320, 4).unwrap();
        assert_eq!(result.total_requests(), 2000);
        assert_eq!(result.runs, 4);
        assert!((0.0..=1.0).contains(&result.average_hit_rate));
        let average_sum: f64 = result.per_cell_average_hits.values().sum();
        assert!((average_sum * 4.0 - result.total_hits as f64).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_aggregate_is_reproducible_across_thread_counts() {
        let model = SpatialModel::Gaussian { mean: 2500.0, stddev: 400.0 };
        let a = Simulator::new(params(99)).unwrap().aggregate(800, &model, 4320, 5).unwrap();
        let b = Simulator::new(SimulationParams { threads: 1, ..params(99) })
            .unwrap()
            .aggregate(800, &model, 4320, 5)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_run_density_uses_configured_defaults() {
        let sim = Simulator::new(SimulationParams { runs: 3, ..params(5) }).unwrap();
        let result = sim.run_density(100, &uniform()).unwrap();
        assert_eq!(result.runs, 3);
        assert_eq!(result.total_requests(), 300);
    }

    #[test]
    fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let sim = Simulator::new(params(1)).unwrap().with_cancel_flag(flag);
        match sim.aggregate(100, &uniform(), 4320, 3) {
            Err(SimError::Cancelled { completed_runs }) => assert_eq!(completed_runs, 0),
            other => panic!("expected cancellation, got {:?}", other),
        }
    }

    #[test]
    fn test_uncancelled_flag_runs_normally() {
        let flag = Arc::new(AtomicBool::new(false));
        let sim = Simulator::new(params(1)).unwrap().with_cancel_flag(flag);
        assert!(sim.aggregate(100, &uniform(), 4320, 3).is_ok());
    }

    #[test]
    fn test_sample_points_in_bounds_and_seeded() {
        let sim = Simulator::new(params(11)).unwrap();
        let a = sim.sample_points(&uniform(), 200, 0).unwrap();
        let b = sim.sample_points(&uniform(), 200, 0).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|p| p.x >= 0.0 && p.x <= 4999.0 && p.y >= 0.0 && p.y <= 4999.0));
        assert_eq!(sim.grid().cells_per_axis(), 50);
    }
}
