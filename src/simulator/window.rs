//! Windowed cache simulation
//!
//! One [`CacheState`] lives for exactly one run. It maps each grid cell to
//! the timestamps at which the cell was populated (its past misses), in
//! processing order. Requests are not sorted by time before processing.
//!
//! # Hit condition
//!
//! A request at `timestamp` hits if any recorded `t` satisfies
//! `timestamp - t <= ttl`. No lower bound is applied, so a request whose
//! timestamp is *earlier* than the populating miss still hits. Because every
//! timestamp of a run is drawn from `[0, ttl]`, the first miss in a cell
//! turns every later request to that cell into a hit. Histories only grow;
//! nothing is evicted inside a run.

use crate::distribution::sampler::CoordinateSampler;
use crate::distribution::PreparedModel;
use crate::grid::{Grid, GridCell};
use crate::stats::RunResult;
use rand::Rng;
use std::collections::HashMap;

/// Classification of one simulated request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Miss,
}

/// Per-run cache: cell → population timestamps
#[derive(Debug, Clone, Default)]
pub struct CacheState {
    entries: HashMap<GridCell, Vec<u64>>,
}

impl CacheState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a request and record it on a miss
    ///
    /// `timestamp <= t + ttl` is the unsigned form of `timestamp - t <= ttl`.
    #[inline]
    pub fn process_request(&mut self, cell: GridCell, timestamp: u64, ttl: u64) -> Outcome {
        let history = self.entries.entry(cell).or_default();
        let hit = history.iter().any(|&t| timestamp <= t.saturating_add(ttl));
        if hit {
            Outcome::Hit
        } else {
            history.push(timestamp);
            Outcome::Miss
        }
    }

    /// Population timestamps recorded for `cell`, in processing order
    #[cfg(test)]
    fn history(&self, cell: GridCell) -> &[u64] {
        self.entries.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total recorded population events across all cells
    pub fn total_entries(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Simulate one complete run against a fresh cache
///
/// For each request: draw a timestamp uniformly from `[0, ttl]`, sample a
/// coordinate, index its cell and classify it. Requests are processed one at
/// a time since every miss changes the outcome of later requests.
pub fn simulate_run(
    num_requests: u64,
    model: &PreparedModel,
    grid: &Grid,
    ttl: u64,
    sampler: &mut CoordinateSampler,
) -> RunResult {
    let mut cache = CacheState::new();
    let mut result = RunResult::new();

    for _ in 0..num_requests {
        let timestamp = sampler.rng_mut().gen_range(0..=ttl);
        let point = sampler.sample_prepared(model);
        let cell = grid.cell_of(point);

        match cache.process_request(cell, timestamp, ttl) {
            Outcome::Hit => result.record_hit(cell),
            Outcome::Miss => result.record_miss(),
        }
    }

    debug_assert_eq!(cache.total_entries() as u64, result.misses());
    result
}
