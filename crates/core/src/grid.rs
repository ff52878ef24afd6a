//! Grid module - fixed cell geometry
//!
//! The grid is a rows x columns set of square cells addressed by a flat row-major index.
//! A cell's center is `origin + (column, row) * pitch` where `pitch = cell_size + spacing`.
//! Geometry never changes after construction; occupancy lives in the registry.

use arrayvec::ArrayVec;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::types::{CellCoord, Point};

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub coord: CellCoord,
    pub center: Point,
}

/// Compute every cell of a grid, row-major
///
/// # Examples
///
/// ```
/// use honeycomb_core::grid::compute_cell_positions;
/// use honeycomb_core::types::Point;
///
/// let cells = compute_cell_positions(2, 3, 70.0, 10.0, Point::new(35.0, 187.0)).unwrap();
/// assert_eq!(cells.len(), 6);
/// assert_eq!(cells[1].center, Point::new(115.0, 187.0));
/// assert_eq!(cells[3].center, Point::new(35.0, 267.0));
/// ```
pub fn compute_cell_positions(
    rows: u32,
    columns: u32,
    cell_size: f32,
    spacing: f32,
    origin: Point,
) -> Result<Vec<Cell>, GameError> {
    if rows == 0 || columns == 0 {
        return Err(GameError::InvalidConfiguration {
            reason: "grid must have at least one row and one column",
        });
    }
    if !(cell_size.is_finite() && cell_size > 0.0) {
        return Err(GameError::InvalidConfiguration {
            reason: "cell size must be positive",
        });
    }
    if !(spacing.is_finite() && spacing >= 0.0) || !origin.is_finite() {
        return Err(GameError::InvalidConfiguration {
            reason: "spacing and origin must be finite",
        });
    }

    let pitch = cell_size + spacing;
    let mut cells = Vec::with_capacity(rows as usize * columns as usize);
    for row in 0..rows {
        for column in 0..columns {
            cells.push(Cell {
                coord: CellCoord::new(row, column),
                center: origin.offset(column as f32 * pitch, row as f32 * pitch),
            });
        }
    }
    Ok(cells)
}

/// Immutable cell layout for one configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: u32,
    columns: u32,
    cell_size: f32,
    spacing: f32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(
        rows: u32,
        columns: u32,
        cell_size: f32,
        spacing: f32,
        origin: Point,
    ) -> Result<Self, GameError> {
        let cells = compute_cell_positions(rows, columns, cell_size, spacing, origin)?;
        Ok(Self {
            rows,
            columns,
            cell_size,
            spacing,
            cells,
        })
    }

    pub fn from_config(config: &GameConfig) -> Result<Self, GameError> {
        Self::new(
            config.rows,
            config.columns,
            config.cell_size,
            config.spacing,
            config.origin,
        )
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Distance between neighboring cell centers
    pub fn pitch(&self) -> f32 {
        self.cell_size + self.spacing
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Center of the cell at `index`
    ///
    /// Panics if `index` is out of range; indices only come from this grid.
    pub fn center(&self, index: usize) -> Point {
        self.cells[index].center
    }

    pub fn coord(&self, index: usize) -> CellCoord {
        self.cells[index].coord
    }

    /// Flat index of (row, column), if inside the grid
    pub fn index_of(&self, coord: CellCoord) -> Option<usize> {
        if coord.row >= self.rows || coord.column >= self.columns {
            return None;
        }
        Some(coord.row as usize * self.columns as usize + coord.column as usize)
    }

    /// Find the cell whose center is within the position tolerance of `point`
    pub fn locate(&self, point: Point) -> Option<usize> {
        self.cells.iter().position(|c| c.center.is_close_to(point))
    }

    /// Orthogonal neighbors of a cell: up, down, left, right
    ///
    /// Neighbor centers are exactly one pitch away and matched with the fuzzy
    /// position tolerance, so edge cells simply have fewer neighbors.
    pub fn neighbors(&self, index: usize) -> ArrayVec<usize, 4> {
        let pitch = self.pitch();
        let center = self.center(index);
        let offsets = [(0.0, -pitch), (0.0, pitch), (-pitch, 0.0), (pitch, 0.0)];

        let mut out = ArrayVec::new();
        for (dx, dy) in offsets {
            if let Some(n) = self.locate(center.offset(dx, dy)) {
                out.push(n);
            }
        }
        out
    }
}
