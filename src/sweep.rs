//! Density and model sweeps
//!
//! Drives the simulation core the way a capacity study does: every named
//! model is evaluated at every configured density, producing a hit-rate
//! curve, a heat grid of where hits land, and a handful of illustrative
//! request coordinates. Named scenarios get dedicated aggregate calls for
//! the summary report.
//!
//! With a fixed seed, each (model, density) pair and each scenario gets its
//! own sub-seed, so a whole sweep is reproducible.

use crate::config::{Config, NamedModel};
use crate::distribution::{Coordinate, SpatialModel};
use crate::grid::Grid;
use crate::simulator::{derive_seed, SimulationParams, Simulator};
use crate::stats::aggregator::AggregateResult;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Seed namespaces, so sweep and scenario calls never share a base seed
const SWEEP_STREAM: u64 = 1;
const SCENARIO_STREAM: u64 = 2;

/// One point of a model's hit-rate curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityPoint {
    pub requests: u64,
    pub average_hit_rate: f64,
    pub total_hits: u64,
    pub total_misses: u64,
    /// Cells that received at least one hit in some run
    pub cells_hit: usize,
}

impl DensityPoint {
    fn from_result(requests: u64, result: &AggregateResult) -> Self {
        Self {
            requests,
            average_hit_rate: result.average_hit_rate,
            total_hits: result.total_hits,
            total_misses: result.total_misses,
            cells_hit: result.per_cell_average_hits.len(),
        }
    }
}

/// Per-cell average hits summed over a sweep, indexed `[y][x]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatGrid {
    pub cells_per_axis: u32,
    pub values: Vec<Vec<f64>>,
}

impl HeatGrid {
    pub fn new(cells_per_axis: u32) -> Self {
        let n = cells_per_axis as usize;
        Self {
            cells_per_axis,
            values: vec![vec![0.0; n]; n],
        }
    }

    /// Add one aggregate's per-cell averages; cells outside the grid are ignored
    pub fn accumulate(&mut self, grid: &Grid, result: &AggregateResult) {
        for (cell, hits) in &result.per_cell_average_hits {
            let in_heat = cell.x < self.cells_per_axis && cell.y < self.cells_per_axis;
            if grid.contains(*cell) && in_heat {
                self.values[cell.y as usize][cell.x as usize] += hits;
            }
        }
    }

    pub fn max(&self) -> f64 {
        self.values
            .iter()
            .flat_map(|row| row.iter().copied())
            .fold(0.0, f64::max)
    }

    /// Scale so the hottest cell is 1.0; an all-zero grid stays all zero
    pub fn normalized(&self) -> HeatGrid {
        let max = self.max();
        if max <= 0.0 {
            return self.clone();
        }
        HeatGrid {
            cells_per_axis: self.cells_per_axis,
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|v| v / max).collect())
                .collect(),
        }
    }
}

/// Sweep results for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSweep {
    pub name: String,
    pub model: SpatialModel,
    pub points: Vec<DensityPoint>,
    /// Normalized heat grid, when enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heat_grid: Option<HeatGrid>,
    pub sample_points: Vec<Coordinate>,
}

/// A model that failed and was skipped under `keep_going`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedModel {
    pub name: String,
    pub error: String,
}

/// Complete sweep output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub generated_at: DateTime<Utc>,
    pub simulation: SimulationParams,
    pub densities: Vec<u64>,
    pub models: Vec<ModelSweep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedModel>,
}

/// Summary figures for one named scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub model: String,
    pub requests: u64,
    pub total_calls: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_percent: f64,
    pub miss_percent: f64,
}

impl ScenarioOutcome {
    /// Share of upstream API calls avoided, in percent
    pub fn calls_saved_percent(&self) -> f64 {
        self.hit_percent
    }
}

/// A sampled request coordinate with its grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub cell_x: u32,
    pub cell_y: u32,
}

/// Illustrative coordinates drawn from one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleReport {
    pub model: String,
    pub area_size: f64,
    pub cell_size: f64,
    pub points: Vec<SamplePoint>,
}

/// Base seed for one aggregate call, mixed in once per path component
fn call_seed(base: Option<u64>, path: &[u64]) -> Option<u64> {
    base.map(|seed| path.iter().fold(seed, |acc, &stream| derive_seed(acc, stream)))
}

fn aggregate_for(
    sim: &Simulator,
    requests: u64,
    model: &SpatialModel,
    path: &[u64],
) -> Result<AggregateResult> {
    let params = sim.params();
    let result = match call_seed(params.seed, path) {
        Some(seed) => sim.aggregate_seeded(requests, model, params.ttl, params.runs, seed)?,
        None => sim.run_density(requests, model)?,
    };
    Ok(result)
}

/// Sweep one model over every density
pub fn sweep_model(
    sim: &Simulator,
    named: &NamedModel,
    model_index: usize,
    config: &Config,
) -> Result<ModelSweep> {
    info!(model = %named.name, "running sweep for {} distribution", named.model.kind());

    let grid = sim.grid();
    let mut heat = HeatGrid::new(grid.cells_per_axis());
    let mut points = Vec::with_capacity(config.densities.len());

    for (density_index, &requests) in config.densities.iter().enumerate() {
        debug!(model = %named.name, requests, "simulating density");
        let path = [SWEEP_STREAM, model_index as u64, density_index as u64];
        let result = aggregate_for(sim, requests, &named.model, &path)
            .with_context(|| format!("Model '{}' failed at density {}", named.name, requests))?;

        heat.accumulate(grid, &result);
        points.push(DensityPoint::from_result(requests, &result));
    }

    let sample_points = if config.output.sample_points > 0 {
        sim.sample_points(&named.model, config.output.sample_points, model_index as u64)?
    } else {
        Vec::new()
    };

    Ok(ModelSweep {
        name: named.name.clone(),
        model: named.model.clone(),
        points,
        heat_grid: config.output.heatmap.then(|| heat.normalized()),
        sample_points,
    })
}

/// Sweep every configured model
///
/// A failing model aborts the sweep unless `runtime.keep_going` is set, in
/// which case it is logged and listed under `skipped`.
pub fn run_sweep(sim: &Simulator, config: &Config) -> Result<SweepReport> {
    let mut models = Vec::with_capacity(config.models.len());
    let mut skipped = Vec::new();

    for (model_index, named) in config.models.iter().enumerate() {
        match sweep_model(sim, named, model_index, config) {
            Ok(sweep) => models.push(sweep),
            Err(e) if config.runtime.keep_going => {
                error!(model = %named.name, "skipping model: {:#}", e);
                skipped.push(SkippedModel {
                    name: named.name.clone(),
                    error: format!("{:#}", e),
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(models = models.len(), skipped = skipped.len(), "sweep complete");

    Ok(SweepReport {
        generated_at: Utc::now(),
        simulation: sim.params().clone(),
        densities: config.densities.clone(),
        models,
        skipped,
    })
}

/// Run the configured scenarios
pub fn run_scenarios(sim: &Simulator, config: &Config) -> Result<Vec<ScenarioOutcome>> {
    let mut outcomes = Vec::with_capacity(config.scenarios.len());

    for (index, scenario) in config.scenarios.iter().enumerate() {
        let named = config
            .model(&scenario.model)
            .with_context(|| {
                format!(
                    "Scenario '{}' references unknown model '{}'",
                    scenario.name, scenario.model
                )
            })?;

        info!(
            scenario = %scenario.name,
            model = %named.name,
            requests = scenario.requests,
            "running scenario"
        );
        let path = [SCENARIO_STREAM, index as u64];
        let result = aggregate_for(sim, scenario.requests, &named.model, &path)
            .with_context(|| format!("Scenario '{}' failed", scenario.name))?;

        outcomes.push(ScenarioOutcome {
            name: scenario.name.clone(),
            model: named.name.clone(),
            requests: scenario.requests,
            total_calls: result.total_requests(),
            hits: result.total_hits,
            misses: result.total_misses,
            hit_percent: result.hit_percent(),
            miss_percent: result.miss_percent(),
        });
    }

    Ok(outcomes)
}

/// Draw `count` coordinates from a named model, with their cells
pub fn draw_samples(sim: &Simulator, named: &NamedModel, count: usize) -> Result<SampleReport> {
    let grid = sim.grid();
    let coordinates = sim
        .sample_points(&named.model, count, 0)
        .with_context(|| format!("Failed to sample model '{}'", named.name))?;

    let points = coordinates
        .into_iter()
        .map(|c| {
            let cell = grid.cell_of(c);
            SamplePoint { x: c.x, y: c.y, cell_x: cell.x, cell_y: cell.y }
        })
        .collect();

    Ok(SampleReport {
        model: named.name.clone(),
        area_size: grid.area_size(),
        cell_size: grid.cell_size(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scenario;
    use crate::grid::GridCell;
    use std::collections::BTreeMap;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.simulation.seed = Some(2024);
        config.simulation.runs = 2;
        config.simulation.threads = 2;
        config.densities = vec![50, 400];
        config.output.sample_points = 20;
        config
    }

    fn result_with(cells: &[((u32, u32), f64)]) -> AggregateResult {
        AggregateResult {
            per_cell_average_hits: cells
                .iter()
                .map(|((x, y), v)| (GridCell::new(*x, *y), *v))
                .collect::<BTreeMap<_, _>>(),
            ..AggregateResult::default()
        }
    }

    #[test]
    fn test_call_seeds_are_distinct_per_model_and_density() {
        let seed = Some(7);
        let a = call_seed(seed, &[SWEEP_STREAM, 0, 1 << 24]);
        let b = call_seed(seed, &[SWEEP_STREAM, 1, 0]);
        let c = call_seed(seed, &[SCENARIO_STREAM, 0]);
        let d = call_seed(seed, &[SWEEP_STREAM, 0]);
        assert_ne!(a, b);
        assert_ne!(c, d);
        assert_eq!(a, call_seed(seed, &[SWEEP_STREAM, 0, 1 << 24]));
        assert_eq!(call_seed(None, &[SWEEP_STREAM, 0, 0]), None);
    }

    #[test]
    fn test_heat_grid_accumulates_and_normalizes() {
        let grid = Grid::new(100.0, 500.0).unwrap();
        let mut heat = HeatGrid::new(grid.cells_per_axis());
        heat.accumulate(&grid, &result_with(&[((1, 2), 2.0), ((0, 0), 1.0)]));
        heat.accumulate(&grid, &result_with(&[((1, 2), 2.0), ((9, 9), 100.0)]));

        assert_eq!(heat.values[2][1], 4.0);
        assert_eq!(heat.max(), 4.0);

        let normalized = heat.normalized();
        assert_eq!(normalized.values[2][1], 1.0);
        assert_eq!(normalized.values[0][0], 0.25);
    }

    #[test]
    fn test_empty_heat_grid_normalizes_to_zero() {
        let heat = HeatGrid::new(3);
        assert_eq!(heat.normalized(), heat);
    }

    #[test]
    fn test_run_sweep_covers_models_and_densities() {
        let config = test_config();
        let sim = Simulator::new(config.simulation.clone()).unwrap();
        let report = run_sweep(&sim, &config).unwrap();

        assert_eq!(report.models.len(), 4);
        for sweep in &report.models {
            assert_eq!(sweep.points.len(), 2);
            assert_eq!(sweep.sample_points.len(), 20);
            assert!(sweep.points.iter().all(|p| (0.0..=1.0).contains(&p.average_hit_rate)));
            assert_eq!(sweep.points[1].total_hits + sweep.points[1].total_misses, 800);
            let heat = sweep.heat_grid.as_ref().unwrap();
            assert_eq!(heat.cells_per_axis, 50);
            assert!(heat.max() <= 1.0);
        }
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_run_sweep_is_reproducible_with_seed() {
        let config = test_config();
        let sim = Simulator::new(config.simulation.clone()).unwrap();
        let a = run_sweep(&sim, &config).unwrap();
        let b = run_sweep(&sim, &config).unwrap();
        assert_eq!(a.models, b.models);
    }

    #[test]
    fn test_heatmap_can_be_disabled() {
        let mut config = test_config();
        config.output.heatmap = false;
        config.output.sample_points = 0;
        config.models.truncate(1);
        let sim = Simulator::new(config.simulation.clone()).unwrap();
        let report = run_sweep(&sim, &config).unwrap();
        assert!(report.models[0].heat_grid.is_none());
        assert!(report.models[0].sample_points.is_empty());
    }

    #[test]
    fn test_failing_model_aborts_or_is_skipped() {
        let mut config = test_config();
        config.models.truncate(1);
        config.models.push(NamedModel::new(
            "Broken",
            SpatialModel::Uniform { min: 10.0, max: 0.0 },
        ));
        let sim = Simulator::new(config.simulation.clone()).unwrap();

        let err = run_sweep(&sim, &config).unwrap_err();
        assert!(format!("{:#}", err).contains("Broken"));

        config.runtime.keep_going = true;
        let report = run_sweep(&sim, &config).unwrap();
        assert_eq!(report.models.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "Broken");
    }

    #[test]
    fn test_run_scenarios() {
        let mut config = test_config();
        config.scenarios = vec![
            Scenario::new("Dense", "Downtown", 1000),
            Scenario::new("Empty", "Suburban", 0),
        ];
        let sim = Simulator::new(config.simulation.clone()).unwrap();
        let outcomes = run_scenarios(&sim, &config).unwrap();

        assert_eq!(outcomes.len(), 2);
        let dense = &outcomes[0];
        assert_eq!(dense.total_calls, 2000);
        assert_eq!(dense.hits + dense.misses, dense.total_calls);
        assert!((dense.hit_percent + dense.miss_percent - 100.0).abs() < 1e-9);
        assert_eq!(dense.calls_saved_percent(), dense.hit_percent);

        let empty = &outcomes[1];
        assert_eq!(empty.total_calls, 0);
        assert_eq!(empty.hit_percent, 0.0);
        assert_eq!(empty.miss_percent, 0.0);
    }

    #[test]
    fn test_draw_samples_reports_cells() {
        let config = test_config();
        let sim = Simulator::new(config.simulation.clone()).unwrap();
        let named = config.model("Tuscany").unwrap();
        let report = draw_samples(&sim, named, 50).unwrap();

        assert_eq!(report.model, "Tuscany");
        assert_eq!(report.points.len(), 50);
        for p in &report.points {
            assert_eq!(p.cell_x, (p.x / 100.0).floor() as u32);
            assert_eq!(p.cell_y, (p.y / 100.0).floor() as u32);
            assert!(p.cell_x < 50 && p.cell_y < 50);
        }
    }

    #[test]
    fn test_scenario_with_unknown_model_fails() {
        let mut config = test_config();
        config.scenarios = vec![Scenario::new("Lost", "Atlantis", 10)];
        let sim = Simulator::new(config.simulation.clone()).unwrap();
        assert!(run_scenarios(&sim, &config).is_err());
    }
}
