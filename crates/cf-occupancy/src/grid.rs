//! Dense boolean occupancy raster.
//!
//! # Axis convention
//!
//! Rows run along world x *decreasing*: row 0 sits at `bounds.max.x`.
//! Columns run along world y increasing: column 0 sits at `bounds.min.y`.
//! The row count therefore derives from the x extent and the column count
//! from the y extent. Every consumer of a grid must read it with the same
//! convention.
//!
//! Cells live in an 8-bit [`GrayImage`] with one pixel per cell: image `y`
//! is the row, image `x` the column, `0` is free and `255` occupied.

// Raster dimensions are far below 2^52
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use image::{GrayImage, Luma, imageops};
use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb2;
#[cfg(feature = "serde")]
use crate::error::OccupancyError;

/// Upper bound on `rows * columns` for a single grid (one byte per cell).
pub const MAX_GRID_CELLS: usize = 1 << 30;

/// Pixel value of an occupied cell.
pub(crate) const OCCUPIED: Luma<u8> = Luma([u8::MAX]);

/// A dense occupied/free raster over a world rectangle.
///
/// # Example
///
/// ```
/// use cf_occupancy::{Aabb2, OccupancyGrid};
/// use nalgebra::Point2;
///
/// let bounds = Aabb2::new(Point2::new(0.0, 0.0), Point2::new(4.0, 2.0));
/// let mut grid = OccupancyGrid::new(4, 2, 1.0, bounds);
///
/// grid.set(0, 1, true);
/// assert_eq!(grid.get(0, 1), Some(true));
/// assert_eq!(grid.occupied_count(), 1);
///
/// // Row 0 is at the max-x edge, column 1 at the upper y half.
/// let center = grid.cell_center(0, 1);
/// assert!((center.x - 3.5).abs() < 1e-12);
/// assert!((center.y - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "GridRecord", try_from = "GridRecord"))]
pub struct OccupancyGrid {
    resolution: f64,
    bounds: Aabb2,
    image: GrayImage,
}

impl OccupancyGrid {
    /// Creates a grid with every cell free.
    #[must_use]
    pub fn new(rows: u32, columns: u32, resolution: f64, bounds: Aabb2) -> Self {
        Self {
            resolution,
            bounds,
            image: GrayImage::new(columns, rows),
        }
    }

    /// Creates a zero-sized grid over `bounds`.
    #[must_use]
    pub fn empty(resolution: f64, bounds: Aabb2) -> Self {
        Self::new(0, 0, resolution, bounds)
    }

    /// Number of rows (world x axis).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.image.height() as usize
    }

    /// Number of columns (world y axis).
    #[must_use]
    pub fn columns(&self) -> usize {
        self.image.width() as usize
    }

    /// World units per cell.
    #[must_use]
    pub const fn resolution(&self) -> f64 {
        self.resolution
    }

    /// World rectangle the grid was created for.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb2 {
        &self.bounds
    }

    /// Returns `true` if the grid has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// Row-major cell bytes, `0` = free, anything else = occupied.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Backing image, one pixel per cell.
    #[must_use]
    pub const fn image(&self) -> &GrayImage {
        &self.image
    }

    pub(crate) const fn image_mut(&mut self) -> &mut GrayImage {
        &mut self.image
    }

    fn offset(&self, row: usize, column: usize) -> Option<usize> {
        if row < self.rows() && column < self.columns() {
            Some(row * self.columns() + column)
        } else {
            None
        }
    }

    /// Returns the cell value, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<bool> {
        self.offset(row, column).map(|i| self.as_slice()[i] != 0)
    }

    /// Returns `true` if the cell exists and is occupied.
    #[must_use]
    pub fn is_occupied(&self, row: usize, column: usize) -> bool {
        self.get(row, column).unwrap_or(false)
    }

    /// Sets a cell. Returns `false` (and does nothing) outside the grid.
    pub fn set(&mut self, row: usize, column: usize, occupied: bool) -> bool {
        match self.offset(row, column) {
            Some(i) => {
                let cells: &mut [u8] = &mut self.image;
                cells[i] = if occupied { OCCUPIED.0[0] } else { 0 };
                true
            }
            None => false,
        }
    }

    /// Flips every cell: occupied becomes free and vice versa.
    pub fn invert(&mut self) {
        imageops::invert(&mut self.image);
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.as_slice().iter().filter(|&&cell| cell != 0).count()
    }

    /// Iterates `(row, column)` of occupied cells in row-major order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let columns = self.columns();
        self.as_slice()
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell != 0)
            .map(move |(i, _)| (i / columns, i % columns))
    }

    /// World position of a cell center.
    #[must_use]
    pub fn cell_center(&self, row: usize, column: usize) -> Point2<f64> {
        Point2::new(
            (row as f64 + 0.5).mul_add(-self.resolution, self.bounds.max.x),
            (column as f64 + 0.5).mul_add(self.resolution, self.bounds.min.y),
        )
    }

    /// Cell containing a world point, or `None` outside the grid.
    #[must_use]
    pub fn world_to_cell(&self, point: &Point2<f64>) -> Option<(usize, usize)> {
        let row = ((self.bounds.max.x - point.x) / self.resolution).floor();
        let column = ((point.y - self.bounds.min.y) / self.resolution).floor();
        if row < 0.0 || column < 0.0 || !row.is_finite() || !column.is_finite() {
            return None;
        }
        let (row, column) = (row as usize, column as usize);
        self.offset(row, column).map(|_| (row, column))
    }
}

/// Serialized form of [`OccupancyGrid`].
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct GridRecord {
    rows: u32,
    columns: u32,
    resolution: f64,
    bounds: Aabb2,
    cells: Vec<u8>,
}

#[cfg(feature = "serde")]
impl From<OccupancyGrid> for GridRecord {
    fn from(grid: OccupancyGrid) -> Self {
        Self {
            rows: grid.image.height(),
            columns: grid.image.width(),
            resolution: grid.resolution,
            bounds: grid.bounds,
            cells: grid.image.into_raw(),
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<GridRecord> for OccupancyGrid {
    type Error = OccupancyError;

    fn try_from(record: GridRecord) -> Result<Self, Self::Error> {
        let image = GrayImage::from_raw(record.columns, record.rows, record.cells).ok_or_else(
            || OccupancyError::InvalidInput("grid cell count does not match dimensions".into()),
        )?;
        Ok(Self {
            resolution: record.resolution,
            bounds: record.bounds,
            image,
        })
    }
}

/// Row and column counts for a rectangle split into `step`-sized cells.
///
/// Returns `None` for a non-positive or non-finite step, an inverted
/// rectangle, or more than [`MAX_GRID_CELLS`] cells.
pub(crate) fn cell_counts(bounds: &Aabb2, step: f64) -> Option<(u32, u32)> {
    if !(step > 0.0 && step.is_finite()) || !bounds.is_valid() {
        return None;
    }
    let rows = (bounds.width() / step).ceil();
    let columns = (bounds.height() / step).ceil();
    if !(rows <= f64::from(u32::MAX) && columns <= f64::from(u32::MAX)) {
        return None;
    }
    let (rows, columns) = (rows as u32, columns as u32);
    (rows as usize)
        .checked_mul(columns as usize)
        .filter(|&cells| cells <= MAX_GRID_CELLS)
        .map(|_| (rows, columns))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid_4x3() -> OccupancyGrid {
        OccupancyGrid::new(
            4,
            3,
            0.5,
            Aabb2::new(Point2::new(10.0, 20.0), Point2::new(12.0, 21.5)),
        )
    }

    #[test]
    fn test_new_is_free() {
        let grid = grid_4x3();
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.as_slice().len(), 12);
        assert_eq!(grid.occupied_count(), 0);
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_set_get_out_of_range() {
        let mut grid = grid_4x3();
        assert!(grid.set(3, 2, true));
        assert!(!grid.set(4, 0, true));
        assert!(!grid.set(0, 3, true));
        assert_eq!(grid.get(3, 2), Some(true));
        assert_eq!(grid.get(4, 0), None);
        assert!(!grid.is_occupied(4, 0));
    }

    #[test]
    fn test_image_layout() {
        let mut grid = grid_4x3();
        grid.set(1, 2, true);
        assert_eq!(grid.image().dimensions(), (3, 4));
        assert_eq!(grid.image().get_pixel(2, 1)[0], u8::MAX);
        assert_eq!(grid.as_slice()[5], u8::MAX);
    }

    #[test]
    fn test_invert() {
        let mut grid = grid_4x3();
        grid.set(1, 1, true);
        grid.invert();
        assert_eq!(grid.occupied_count(), 11);
        assert!(!grid.is_occupied(1, 1));
    }

    #[test]
    fn test_iter_occupied_row_major() {
        let mut grid = grid_4x3();
        grid.set(2, 0, true);
        grid.set(0, 2, true);
        grid.set(2, 1, true);
        let cells: Vec<_> = grid.iter_occupied().collect();
        assert_eq!(cells, vec![(0, 2), (2, 0), (2, 1)]);
    }

    #[test]
    fn test_cell_center_axis_convention() {
        let grid = grid_4x3();
        let first = grid.cell_center(0, 0);
        assert_relative_eq!(first.x, 11.75);
        assert_relative_eq!(first.y, 20.25);

        let last = grid.cell_center(3, 2);
        assert_relative_eq!(last.x, 10.25);
        assert_relative_eq!(last.y, 21.25);
    }

    #[test]
    fn test_world_to_cell_roundtrip() {
        let grid = grid_4x3();
        for row in 0..grid.rows() {
            for column in 0..grid.columns() {
                let center = grid.cell_center(row, column);
                assert_eq!(grid.world_to_cell(&center), Some((row, column)));
            }
        }
        assert_eq!(grid.world_to_cell(&Point2::new(12.5, 20.5)), None);
        assert_eq!(grid.world_to_cell(&Point2::new(11.0, 19.9)), None);
        assert_eq!(grid.world_to_cell(&Point2::new(11.0, 22.0)), None);
    }

    #[test]
    fn test_empty() {
        let grid = OccupancyGrid::empty(1.0, Aabb2::default());
        assert!(grid.is_empty());
        assert_eq!(grid.get(0, 0), None);
        assert_eq!(grid.iter_occupied().count(), 0);
    }

    #[test]
    fn test_cell_counts() {
        let bounds = Aabb2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 5.0));
        assert_eq!(cell_counts(&bounds, 0.3), Some((34, 17)));
        assert_eq!(cell_counts(&bounds, 0.0), None);
        assert_eq!(cell_counts(&bounds, f64::NAN), None);
        assert_eq!(cell_counts(&Aabb2::from_min_max(bounds.max, bounds.min), 1.0), None);
    }

    #[test]
    fn test_cell_counts_rejects_oversized() {
        // 1e8 x 2e8 cells would need 2e16 bytes.
        let bounds = Aabb2::new(Point2::new(0.0, 0.0), Point2::new(1.0e4, 2.0e4));
        assert_eq!(cell_counts(&bounds, 1.0e-4), None);
        // Beyond u32 along one axis.
        assert_eq!(cell_counts(&bounds, 1.0e-12), None);
        // Exactly at the limit.
        let square = Aabb2::new(Point2::new(0.0, 0.0), Point2::new(32768.0, 32768.0));
        assert_eq!(cell_counts(&square, 1.0), Some((32768, 32768)));
        assert_eq!(cell_counts(&square, 0.999), None);
    }
}
