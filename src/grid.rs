//! Grid indexing
//!
//! Maps continuous coordinates onto square cells of `cell_size` meters. The
//! cell is the unit of cache granularity: every request landing in the same
//! cell shares one cache entry.

use crate::distribution::Coordinate;
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete cell key, `(floor(x / cell_size), floor(y / cell_size))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
}

impl GridCell {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Raw cell computation with no bounds check
///
/// Negative inputs floor below zero and are clamped to cell 0 by the cast;
/// callers are expected to pass clamped coordinates.
#[inline]
pub fn cell_of(coordinate: Coordinate, cell_size: f64) -> GridCell {
    GridCell {
        x: (coordinate.x / cell_size).floor() as u32,
        y: (coordinate.y / cell_size).floor() as u32,
    }
}

/// A square grid laid over the simulated area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    cell_size: f64,
    area_size: f64,
    cells_per_axis: u32,
}

impl Grid {
    /// Build a grid of `cell_size` cells over an `area_size` square
    ///
    /// The grid covers every coordinate in `[0, area_size - 1]`, so
    /// `cells_per_axis = floor((area_size - 1) / cell_size) + 1`. For an area
    /// that is a whole number of cells this is simply `area_size / cell_size`.
    pub fn new(cell_size: f64, area_size: f64) -> Result<Self, SimError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(SimError::config(format!(
                "grid cell size must be positive, got {}",
                cell_size
            )));
        }
        if !area_size.is_finite() || area_size < 1.0 {
            return Err(SimError::config(format!(
                "area size must be at least 1 meter, got {}",
                area_size
            )));
        }
        let cells = ((area_size - 1.0) / cell_size).floor() + 1.0;
        if cells > u32::MAX as f64 {
            return Err(SimError::config(format!(
                "grid of {} cells per axis is too large",
                cells
            )));
        }
        Ok(Self {
            cell_size,
            area_size,
            cells_per_axis: cells as u32,
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn area_size(&self) -> f64 {
        self.area_size
    }

    pub fn cells_per_axis(&self) -> u32 {
        self.cells_per_axis
    }

    /// Total number of cells in the grid
    pub fn num_cells(&self) -> u64 {
        self.cells_per_axis as u64 * self.cells_per_axis as u64
    }

    /// Whether `cell` lies inside the grid
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x < self.cells_per_axis && cell.y < self.cells_per_axis
    }

    /// Map a clamped coordinate to its cell
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside `[0, area_size - 1]`, i.e. the
    /// sampler's clamping invariant was broken.
    #[inline]
    pub fn cell_of(&self, coordinate: Coordinate) -> GridCell {
        assert!(
            coordinate.x >= 0.0 && coordinate.y >= 0.0,
            "coordinate {:?} is negative",
            coordinate
        );
        let cell = cell_of(coordinate, self.cell_size);
        assert!(
            self.contains(cell),
            "coordinate {:?} maps to cell {} outside the {}x{} grid",
            coordinate,
            cell,
            self.cells_per_axis,
            self.cells_per_axis
        );
        cell
    }
}
