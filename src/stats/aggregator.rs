//! Run aggregation
//!
//! Merges the results of repeated runs of one (density, model) pair into a
//! single [`AggregateResult`]. Averaging over several runs smooths out the
//! stochastic noise of a single Monte-Carlo pass.
//!
//! # Example
//!
//! ```
//! use geocache_sim::grid::GridCell;
//! use geocache_sim::stats::{RunResult, aggregator::RunAggregator};
//!
//! let mut run0 = RunResult::new();
//! run0.record_miss();
//! run0.record_hit(GridCell::new(1, 1));
//!
//! let mut run1 = RunResult::new();
//! run1.record_miss();
//! run1.record_miss();
//!
//! let mut aggregator = RunAggregator::new();
//! aggregator.add_run(0, run0);
//! aggregator.add_run(1, run1);
//!
//! let result = aggregator.aggregate();
//! assert_eq!(result.total_hits, 1);
//! assert_eq!(result.total_misses, 3);
//! assert_eq!(result.per_cell_average_hits[&GridCell::new(1, 1)], 0.5);
//! ```

use crate::grid::GridCell;
use crate::stats::RunResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Averaged outcome of repeated runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// `total_hits / (total_hits + total_misses)`, 0 when nothing ran
    pub average_hit_rate: f64,
    /// Hits per cell summed over runs, divided by the number of runs
    #[serde(with = "cell_map")]
    pub per_cell_average_hits: BTreeMap<GridCell, f64>,
    pub total_hits: u64,
    pub total_misses: u64,
    /// Number of runs averaged
    pub runs: usize,
}

impl AggregateResult {
    pub fn total_requests(&self) -> u64 {
        self.total_hits + self.total_misses
    }

    pub fn hit_percent(&self) -> f64 {
        self.average_hit_rate * 100.0
    }

    pub fn miss_percent(&self) -> f64 {
        if self.total_requests() == 0 {
            0.0
        } else {
            self.total_misses as f64 / self.total_requests() as f64 * 100.0
        }
    }
}

/// Serializes the per-cell map as a list of `{x, y, hits}` entries
///
/// JSON objects need string keys, so a struct-keyed map cannot be written
/// directly.
mod cell_map {
    use super::GridCell;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Serialize, Deserialize)]
    struct Entry {
        x: u32,
        y: u32,
        hits: f64,
    }

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<GridCell, f64>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        let entries: Vec<Entry> = map
            .iter()
            .map(|(cell, hits)| Entry { x: cell.x, y: cell.y, hits: *hits })
            .collect();
        entries.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<GridCell, f64>, D::Error> {
        let entries = Vec::<Entry>::deserialize(d)?;
        Ok(entries
            .into_iter()
            .map(|e| (GridCell::new(e.x, e.y), e.hits))
            .collect())
    }
}

/// Collects run results and computes the aggregate view
///
/// # Usage
///
/// 1. Create aggregator with `new()`
/// 2. Add each finished run with `add_run()`
/// 3. Get the averaged view with `aggregate()`
#[derive(Debug)]
pub struct RunAggregator {
    /// Per-run results (run index → result)
    runs: HashMap<usize, RunResult>,

    /// Cached aggregate (computed on demand)
    aggregate_cache: Option<AggregateResult>,
}

impl RunAggregator {
    pub fn new() -> Self {
        Self {
            runs: HashMap::new(),
            aggregate_cache: None,
        }
    }

    /// Add the result of a completed run
    ///
    /// Re-adding an index replaces the earlier result.
    pub fn add_run(&mut self, run_index: usize, result: RunResult) {
        self.runs.insert(run_index, result);
        self.aggregate_cache = None;
    }

    pub fn num_runs(&self) -> usize {
        self.runs.len()
    }

    /// Averaged result over every added run
    ///
    /// The result is cached until another run is added.
    pub fn aggregate(&mut self) -> &AggregateResult {
        self.aggregate_cache.get_or_insert_with(|| compute_aggregate(&self.runs))
    }
}

impl Default for RunAggregator {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_aggregate(runs: &HashMap<usize, RunResult>) -> AggregateResult {
    let mut total = RunResult::new();
    for run in runs.values() {
        total.merge(run);
    }

    // Integer sums are order independent, so the averages are too
    let num_runs = runs.len();
    let per_cell_average_hits = if num_runs == 0 {
        BTreeMap::new()
    } else {
        total
            .per_cell_hits()
            .iter()
            .map(|(cell, hits)| (*cell, *hits as f64 / num_runs as f64))
            .collect()
    };

    AggregateResult {
        average_hit_rate: total.hit_rate(),
        per_cell_average_hits,
        total_hits: total.hits(),
        total_misses: total.misses(),
        runs: num_runs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(hits: &[(u32, u32)], misses: u64) -> RunResult {
        let mut r = RunResult::new();
        for (x, y) in hits {
            r.record_hit(GridCell::new(*x, *y));
        }
        for _ in 0..misses {
            r.record_miss();
        }
        r
    }

    #[test]
    fn test_aggregator_new() {
        let aggregator = RunAggregator::new();
        assert_eq!(aggregator.num_runs(), 0);
    }

    #[test]
    fn test_aggregate_empty() {
        let mut aggregator = RunAggregator::new();
        let result = aggregator.aggregate();
        assert_eq!(result.average_hit_rate, 0.0);
        assert_eq!(result.total_hits, 0);
        assert_eq!(result.total_misses, 0);
        assert!(result.per_cell_average_hits.is_empty());
    }

    #[test]
    fn test_runs_without_requests_have_zero_rate() {
        let mut aggregator = RunAggregator::new();
        aggregator.add_run(0, RunResult::new());
        aggregator.add_run(1, RunResult::new());
        let result = aggregator.aggregate();
        assert_eq!(result.average_hit_rate, 0.0);
        assert_eq!(result.runs, 2);
        assert!(result.per_cell_average_hits.is_empty());
    }

    #[test]
    fn test_aggregate_multiple_runs() {
        let mut aggregator = RunAggregator::new();
        aggregator.add_run(0, run(&[(0, 0), (0, 0), (1, 1)], 2));
        aggregator.add_run(1, run(&[(0, 0)], 3));
        aggregator.add_run(2, run(&[], 1));

        let result = aggregator.aggregate();
        assert_eq!(result.total_hits, 4);
        assert_eq!(result.total_misses, 6);
        assert!((result.average_hit_rate - 0.4).abs() < 1e-12);
        let cells = &result.per_cell_average_hits;
        assert_eq!(cells[&GridCell::new(0, 0)], 1.0); // 3 / 3 runs
        assert!((cells[&GridCell::new(1, 1)] - 1.0 / 3.0).abs() < 1e-12);
        assert!(!cells.contains_key(&GridCell::new(7, 7)));
        assert_eq!(result.total_requests(), 10);
        assert!((result.hit_percent() - 40.0).abs() < 1e-9);
        assert!((result.miss_percent() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_cache_invalidation() {
        let mut aggregator = RunAggregator::new();
        aggregator.add_run(0, run(&[(0, 0)], 1));
        assert_eq!(aggregator.aggregate().total_hits, 1);
        assert_eq!(aggregator.aggregate().total_hits, 1);

        aggregator.add_run(1, run(&[(0, 0), (0, 1)], 0));
        assert_eq!(aggregator.aggregate().total_hits, 3);
    }

    #[test]
    fn test_aggregate_result_json_roundtrip_keeps_cells() {
        let mut aggregator = RunAggregator::new();
        aggregator.add_run(0, run(&[(4, 2)], 1));
        let result = aggregator.aggregate().clone();

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"x\":4"));
        let back: AggregateResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
