//! Grid of per-cell boundary polygons.

use nalgebra::Point2;
use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An open ring of world-space vertices (no duplicated closing vertex).
pub type Polygon = Vec<Point2<f64>>;

/// A `rows x columns` table of polygon lists.
///
/// Each cell holds the boundary polygons found inside that cell. Cells are
/// independent: a region spanning several cells appears as separate
/// polygons, one per cell, with no stitching along cell edges.
///
/// # Example
///
/// ```
/// use cf_occupancy::PolygonTable;
/// use nalgebra::Point2;
///
/// let mut table = PolygonTable::new(2, 3);
/// let polygon = vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(0.0, 1.0),
/// ];
/// table.insert(1, 2, polygon);
///
/// assert_eq!(table.get(1, 2).map(<[_]>::len), Some(1));
/// assert_eq!(table.polygon_count(), 1);
/// assert!(table.get(2, 0).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonTable {
    rows: usize,
    columns: usize,
    /// Row-major cells.
    cells: Vec<Vec<Polygon>>,
}

impl PolygonTable {
    /// Creates a table with every cell empty.
    #[must_use]
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![Vec::new(); rows * columns],
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    const fn offset(&self, row: usize, column: usize) -> Option<usize> {
        if row < self.rows && column < self.columns {
            Some(row * self.columns + column)
        } else {
            None
        }
    }

    /// Appends a polygon to a cell. Out-of-range cells are ignored.
    pub fn insert(&mut self, row: usize, column: usize, polygon: Polygon) {
        match self.offset(row, column) {
            Some(i) => self.cells[i].push(polygon),
            None => warn!(
                row,
                column,
                rows = self.rows,
                columns = self.columns,
                "Ignoring polygon for cell outside table"
            ),
        }
    }

    /// Polygons of one cell, or `None` outside the table.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<&[Polygon]> {
        self.offset(row, column).map(|i| self.cells[i].as_slice())
    }

    /// Iterates `(row, column, polygons)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &[Polygon])> + '_ {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i / columns, i % columns, cell.as_slice()))
    }

    /// Total number of polygons across all cells.
    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// Returns `true` if no cell holds a polygon.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Vec::is_empty)
    }

    pub(crate) fn from_cells(rows: usize, columns: usize, cells: Vec<Vec<Polygon>>) -> Self {
        debug_assert_eq!(cells.len(), rows * columns);
        Self {
            rows,
            columns,
            cells,
        }
    }
}
