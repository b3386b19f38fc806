//! Belief distribution over grid cells.

use std::fmt;

use nalgebra::DMatrix;

use crate::error::{LocalizationError, Result};
use crate::grid::Grid;

/// Marker printed in place of a probability for obstacle cells.
pub const OBSTACLE_MARKER: &str = "####";

/// Decimal places kept in every posterior percentage.
pub const PERCENT_DECIMALS: usize = 2;

/// Round a percentage to exactly the value it renders as.
///
/// Goes through the decimal rendering so that binary near-ties such as
/// `0.585` (stored as `0.58499...`) round the same way they print.
pub fn round_percent(value: f64) -> f64 {
    format!("{:.*}", PERCENT_DECIMALS, value).parse().unwrap_or(value)
}

/// Per-cell belief: a weight (percent) for open cells, nothing for obstacles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeliefCell {
    Open(f64),
    Obstacle,
}

impl BeliefCell {
    pub fn weight(self) -> Option<f64> {
        match self {
            BeliefCell::Open(w) => Some(w),
            BeliefCell::Obstacle => None,
        }
    }
}

/// A `rows x cols` distribution of belief over the robot's location.
///
/// Open-cell weights are percentages; after a sensing update they sum to 100.
#[derive(Debug, Clone, PartialEq)]
pub struct Belief {
    cells: DMatrix<BeliefCell>,
}

impl Belief {
    /// Equal belief over every open cell of `grid`.
    pub fn uniform(grid: &Grid) -> Self {
        let share = 100.0 / grid.open_count().max(1) as f64;
        Self::from_fn(grid, |_, _| share)
    }

    /// Belief from explicit weights. Entries for obstacle cells are ignored.
    pub fn from_weights(grid: &Grid, weights: &[Vec<Option<f64>>]) -> Result<Self> {
        if weights.len() != grid.rows() {
            return Err(LocalizationError::DimensionMismatch {
                expected: grid.shape(),
                found: (weights.len(), weights.first().map(Vec::len).unwrap_or(0)),
            });
        }
        for (i, row) in weights.iter().enumerate() {
            if row.len() != grid.cols() {
                return Err(LocalizationError::InvalidDimension {
                    row: i,
                    expected: grid.cols(),
                    found: row.len(),
                });
            }
        }
        for (i, j) in grid.open_cells() {
            match weights[i][j] {
                Some(w) if w.is_finite() && w >= 0.0 => {}
                other => {
                    return Err(LocalizationError::InvalidWeight {
                        row: i,
                        col: j,
                        value: other.unwrap_or(f64::NAN),
                    })
                }
            }
        }
        Ok(Self::from_fn(grid, |i, j| weights[i][j].unwrap_or(0.0)))
    }

    /// Build a belief by evaluating `weight` on every open cell of `grid`.
    pub(crate) fn from_fn(grid: &Grid, mut weight: impl FnMut(usize, usize) -> f64) -> Self {
        let cells = DMatrix::from_fn(grid.rows(), grid.cols(), |i, j| {
            if grid.is_open(i, j) {
                BeliefCell::Open(weight(i, j))
            } else {
                BeliefCell::Obstacle
            }
        });
        Self { cells }
    }

    /// Build a belief from row-major open-cell weights computed elsewhere.
    pub(crate) fn from_row_major(grid: &Grid, weights: &[f64]) -> Self {
        let cols = grid.cols();
        Self::from_fn(grid, |i, j| weights[i * cols + j])
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> BeliefCell {
        self.cells[(row, col)]
    }

    /// Weight of an open cell; `None` for obstacles.
    pub fn weight(&self, row: usize, col: usize) -> Option<f64> {
        self.get(row, col).weight()
    }

    /// Open cells and their weights in row-major order.
    pub fn iter_open(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let cols = self.cols();
        (0..self.rows() * cols).filter_map(move |k| {
            let (i, j) = (k / cols, k % cols);
            self.weight(i, j).map(|w| (i, j, w))
        })
    }

    /// Sum of all open-cell weights.
    pub fn total(&self) -> f64 {
        self.iter_open().map(|(_, _, w)| w).sum()
    }

    /// The open cell with the highest weight; ties resolve to the first in row-major order.
    pub fn most_likely(&self) -> Option<(usize, usize, f64)> {
        self.iter_open().fold(None, |best, cell| match best {
            Some((_, _, w)) if w >= cell.2 => best,
            _ => Some(cell),
        })
    }

    /// Ensure this belief has the grid's shape and obstacle layout.
    pub fn check_against(&self, grid: &Grid) -> Result<()> {
        let mismatch = || LocalizationError::DimensionMismatch {
            expected: grid.shape(),
            found: self.cells.shape(),
        };
        if self.cells.shape() != grid.shape() {
            return Err(mismatch());
        }
        for i in 0..grid.rows() {
            for j in 0..grid.cols() {
                let open = matches!(self.get(i, j), BeliefCell::Open(_));
                if open != grid.is_open(i, j) {
                    return Err(mismatch());
                }
            }
        }
        Ok(())
    }

    /// Cells rendered as 2-decimal percentages, obstacles as [`OBSTACLE_MARKER`].
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        (0..self.rows())
            .map(|i| {
                (0..self.cols())
                    .map(|j| match self.get(i, j) {
                        BeliefCell::Open(w) => format!("{w:.2}"),
                        BeliefCell::Obstacle => OBSTACLE_MARKER.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Belief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.to_rows();
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row.join(" "))?;
        }
        Ok(())
    }
}
