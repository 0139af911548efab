//! Per-run statistics
//!
//! A [`RunResult`] is what one simulated run produces: hit and miss counters
//! plus a per-cell hit tally. Runs never share a `RunResult`; the
//! [`aggregator`] merges them once every run has finished.
//!
//! # Example
//!
//! ```
//! use geocache_sim::grid::GridCell;
//! use geocache_sim::stats::RunResult;
//!
//! let mut run = RunResult::new();
//! run.record_miss();
//! run.record_hit(GridCell::new(3, 4));
//! run.record_hit(GridCell::new(3, 4));
//!
//! assert_eq!(run.requests(), 3);
//! assert_eq!(run.cell_hits(GridCell::new(3, 4)), 2);
//! ```

pub mod aggregator;

use crate::grid::GridCell;
use std::collections::HashMap;

/// Outcome counters of one completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    hits: u64,
    misses: u64,
    per_cell_hits: HashMap<GridCell, u64>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request served from cache
    #[inline]
    pub fn record_hit(&mut self, cell: GridCell) {
        self.hits += 1;
        *self.per_cell_hits.entry(cell).or_insert(0) += 1;
    }

    /// Record a request that had to populate the cache
    #[inline]
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Total requests processed in this run
    pub fn requests(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate of this run alone (0 when no request was processed)
    pub fn hit_rate(&self) -> f64 {
        let total = self.requests();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Hits recorded for `cell` (0 for cells never hit)
    pub fn cell_hits(&self, cell: GridCell) -> u64 {
        self.per_cell_hits.get(&cell).copied().unwrap_or(0)
    }

    /// Cells with at least one hit, with their counts
    pub fn per_cell_hits(&self) -> &HashMap<GridCell, u64> {
        &self.per_cell_hits
    }

    /// Add another run's counters into this one
    pub fn merge(&mut self, other: &RunResult) {
        self.hits += other.hits;
        self.misses += other.misses;
        for (cell, count) in &other.per_cell_hits {
            *self.per_cell_hits.entry(*cell).or_insert(0) += count;
        }
    }
}
