//! Static occupancy grid the robot is localized on.

use nalgebra::DMatrix;

use crate::error::{LocalizationError, Result};
use crate::heading::Heading;

/// Occupancy of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Open,
    Obstacle,
}

/// What lies one step away from a cell in a given heading.
///
/// Coordinates outside the grid are reported as `Blocked`, exactly like an
/// obstacle cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbor {
    Open(usize, usize),
    Blocked,
}

/// Immutable occupancy grid of `rows x cols` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: DMatrix<CellKind>,
}

impl Grid {
    /// Build a grid from rows of `0` (open) / `1` (obstacle).
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if cols == 0 {
            return Err(LocalizationError::InvalidDimension {
                row: 0,
                expected: 1,
                found: 0,
            });
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(LocalizationError::InvalidDimension {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            if let Some((j, &value)) = row.iter().enumerate().find(|(_, v)| **v > 1) {
                return Err(LocalizationError::InvalidCellValue { row: i, col: j, value });
            }
        }
        let cells = DMatrix::from_fn(rows.len(), cols, |i, j| {
            if rows[i][j] == 0 {
                CellKind::Open
            } else {
                CellKind::Obstacle
            }
        });
        Ok(Self { cells })
    }

    /// The 7x7 maze used by the reference scenario.
    pub fn reference() -> Self {
        let mut cells = DMatrix::from_element(7, 7, CellKind::Open);
        for &(i, j) in &[(1, 1), (1, 3), (1, 5), (2, 5), (3, 3), (4, 1), (5, 1), (5, 3), (5, 5)] {
            cells[(i, j)] = CellKind::Obstacle;
        }
        Self { cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.cells.shape()
    }

    /// True iff `(row, col)` lies inside the grid.
    pub fn is_valid(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows() && (col as usize) < self.cols()
    }

    /// True iff the in-bounds cell `(row, col)` is open.
    ///
    /// # Panics
    /// Panics when the coordinate is out of bounds; guard with [`Grid::is_valid`]
    /// or go through [`Grid::neighbor`], which treats the outside as a wall.
    pub fn is_open(&self, row: usize, col: usize) -> bool {
        self.cells[(row, col)] == CellKind::Open
    }

    pub fn kind(&self, row: usize, col: usize) -> CellKind {
        self.cells[(row, col)]
    }

    /// The cell one step from `(row, col)` in `heading`.
    pub fn neighbor(&self, row: usize, col: usize, heading: Heading) -> Neighbor {
        let (dr, dc) = heading.offset();
        let (r, c) = (row as isize + dr, col as isize + dc);
        if self.is_valid(r, c) && self.is_open(r as usize, c as usize) {
            Neighbor::Open(r as usize, c as usize)
        } else {
            Neighbor::Blocked
        }
    }

    /// Open cells in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols();
        (0..self.rows() * cols)
            .map(move |k| (k / cols, k % cols))
            .filter(|&(i, j)| self.is_open(i, j))
    }

    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|&&kind| kind == CellKind::Open).count()
    }
}
