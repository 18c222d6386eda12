//! Occupancy map over ground-plane triangles.
//!
//! An [`OccupancyMap`] owns a triangle soup and an immutable spatial index
//! over the triangles' bounding boxes. From it callers can:
//!
//! - export a double-sided render mesh ([`OccupancyMap::mesh_triangles`]),
//! - run broad-phase box queries ([`OccupancyMap::query_intersect`]),
//! - rasterize a region ([`OccupancyMap::create_occupancy_grid`]),
//! - vectorize a region cell by cell ([`OccupancyMap::create_polygon_table`]),
//! - test polygons against the surface ([`OccupancyMap::intersects`]).
//!
//! The map is never mutated after construction, so it can be shared across
//! threads without locking.
//!
//! # Edge tolerance
//!
//! Rasterization does not clamp triangles to the query rectangle beyond the
//! broad-phase filter. A triangle that merely touches the rectangle can mark
//! cells along the grid edge because of floating-point rounding.

// Table and raster dimensions are far below 2^52
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use nalgebra::{Point2, Point3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::bounds::Aabb2;
use crate::error::{OccupancyError, OccupancyResult};
use crate::grid::{MAX_GRID_CELLS, OccupancyGrid, cell_counts};
use crate::index::{Bvh, IndexEntry, SpatialIndex};
use crate::params::{IndexParams, PolygonTableParams};
use crate::polygon::{polygon_bounds, polygon_polygon_intersects};
use crate::raster::{RasterPoint, fill_triangle, trace_outer_contours};
use crate::table::{Polygon, PolygonTable};
use crate::triangle::Triangle2;

/// Immutable index over ground-plane triangles.
///
/// # Example
///
/// ```
/// use cf_occupancy::{OccupancyMap, Triangle2};
/// use nalgebra::Point2;
///
/// let map = OccupancyMap::build(vec![
///     Triangle2::from_arrays([0.0, 0.0], [10.0, 0.0], [0.0, 10.0]),
/// ])
/// .unwrap();
///
/// assert_eq!(map.mesh_triangles().len(), 6);
/// assert_eq!(map.query_intersect(Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)).len(), 1);
///
/// let grid = map.create_occupancy_grid(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0), 1.0);
/// assert_eq!((grid.rows(), grid.columns()), (10, 10));
/// ```
#[derive(Debug)]
pub struct OccupancyMap<I = Bvh> {
    triangles: Vec<Triangle2>,
    index: I,
    bounds: Aabb2,
}

impl OccupancyMap<Bvh> {
    /// Builds a map backed by a [`Bvh`] with default [`IndexParams`].
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvalidInput`] if `triangles` is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::{OccupancyError, OccupancyMap};
    ///
    /// let result = OccupancyMap::build(Vec::new());
    /// assert!(matches!(result, Err(OccupancyError::InvalidInput(_))));
    /// ```
    pub fn build(triangles: Vec<Triangle2>) -> OccupancyResult<Self> {
        Self::build_indexed(triangles, &IndexParams::default())
    }

    /// Builds a map backed by a [`Bvh`] with explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvalidInput`] if `triangles` is empty.
    pub fn build_with(triangles: Vec<Triangle2>, params: &IndexParams) -> OccupancyResult<Self> {
        Self::build_indexed(triangles, params)
    }
}

impl<I: SpatialIndex> OccupancyMap<I> {
    /// Builds a map backed by any [`SpatialIndex`] implementation.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvalidInput`] if `triangles` is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::{IndexParams, LinearIndex, OccupancyMap, Triangle2};
    ///
    /// let map: OccupancyMap<LinearIndex> = OccupancyMap::build_indexed(
    ///     vec![Triangle2::from_arrays([0.0, 0.0], [1.0, 0.0], [0.0, 1.0])],
    ///     &IndexParams::default(),
    /// )
    /// .unwrap();
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn build_indexed(triangles: Vec<Triangle2>, params: &IndexParams) -> OccupancyResult<Self> {
        if triangles.is_empty() {
            return Err(OccupancyError::InvalidInput(
                "empty occupancy map not allowed".to_string(),
            ));
        }

        let entries = triangles
            .iter()
            .enumerate()
            .map(|(i, triangle)| IndexEntry::new(triangle.bounds(), i))
            .collect();
        let index = I::build(entries, params)?;
        let bounds = index.bounds();

        info!(
            triangles = triangles.len(),
            min_x = bounds.min.x,
            min_y = bounds.min.y,
            max_x = bounds.max.x,
            max_y = bounds.max.y,
            "Built occupancy map"
        );

        Ok(Self {
            triangles,
            index,
            bounds,
        })
    }

    /// Stored triangles in insertion order; positions are the triangle ids.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle2] {
        &self.triangles
    }

    /// Triangle by id.
    #[must_use]
    pub fn triangle(&self, id: usize) -> Option<&Triangle2> {
        self.triangles.get(id)
    }

    /// Number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Always `false`: a map holds at least one triangle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The underlying spatial index.
    #[must_use]
    pub const fn index(&self) -> &I {
        &self.index
    }

    /// Extent of all triangles, as reported by the index.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb2 {
        &self.bounds
    }

    /// Minimum corner of [`bounds`](Self::bounds).
    #[must_use]
    pub const fn bounds_min(&self) -> Point2<f64> {
        self.bounds.min
    }

    /// Maximum corner of [`bounds`](Self::bounds).
    #[must_use]
    pub const fn bounds_max(&self) -> Point2<f64> {
        self.bounds.max
    }

    /// Render mesh at `z = 0`, six points per triangle.
    ///
    /// Each triangle is emitted twice, as `(v0, v1, v2)` and `(v2, v1, v0)`,
    /// so the surface is visible from either side.
    #[must_use]
    pub fn mesh_triangles(&self) -> Vec<Point3<f64>> {
        let mut points = Vec::with_capacity(self.triangles.len() * 6);
        for t in &self.triangles {
            points.push(Point3::new(t.v0.x, t.v0.y, 0.0));
            points.push(Point3::new(t.v1.x, t.v1.y, 0.0));
            points.push(Point3::new(t.v2.x, t.v2.y, 0.0));

            points.push(Point3::new(t.v2.x, t.v2.y, 0.0));
            points.push(Point3::new(t.v1.x, t.v1.y, 0.0));
            points.push(Point3::new(t.v0.x, t.v0.y, 0.0));
        }
        points
    }

    /// Index entries whose bounding box intersects the rectangle.
    ///
    /// This is a broad-phase filter: a returned triangle's box overlaps the
    /// rectangle, the triangle itself may not. Order is unspecified.
    #[must_use]
    pub fn query_intersect(&self, bounds_min: Point2<f64>, bounds_max: Point2<f64>) -> Vec<IndexEntry> {
        self.index.query(&Aabb2::from_min_max(bounds_min, bounds_max))
    }

    /// Rasterizes the triangles overlapping a rectangle.
    ///
    /// The grid has `ceil(width / resolution)` rows along world x (mirrored,
    /// row 0 at `bounds_max.x`) and `ceil(height / resolution)` columns along
    /// world y. Each candidate triangle vertex maps to
    /// `row = floor((bounds_max.x - x) / resolution)`,
    /// `column = floor((y - bounds_min.y) / resolution)` and the triangle is
    /// filled. A non-positive or non-finite resolution, an inverted
    /// rectangle, or more than [`MAX_GRID_CELLS`] cells yields an empty grid.
    #[must_use]
    pub fn create_occupancy_grid(
        &self,
        bounds_min: Point2<f64>,
        bounds_max: Point2<f64>,
        resolution: f64,
    ) -> OccupancyGrid {
        let bounds = Aabb2::from_min_max(bounds_min, bounds_max);
        let Some((rows, columns)) = cell_counts(&bounds, resolution) else {
            warn!(
                resolution,
                width = bounds.width(),
                height = bounds.height(),
                max_cells = MAX_GRID_CELLS,
                "Cannot rasterize region, returning empty grid"
            );
            return OccupancyGrid::empty(resolution, bounds);
        };

        let mut grid = OccupancyGrid::new(rows, columns, resolution, bounds);
        let candidates = self.query_intersect(bounds_min, bounds_max);
        for entry in &candidates {
            let triangle = &self.triangles[entry.id];
            let vertices = triangle
                .vertices()
                .map(|vertex| world_to_raster(&bounds, resolution, &vertex));
            fill_triangle(&mut grid, vertices);
        }

        debug!(
            rows,
            columns,
            candidates = candidates.len(),
            "Rasterized occupancy grid"
        );
        grid
    }

    /// Splits a region into square cells and extracts boundary polygons per cell.
    ///
    /// Equivalent to [`create_polygon_table_with`](Self::create_polygon_table_with)
    /// using [`PolygonTableParams::new`].
    #[must_use]
    pub fn create_polygon_table(
        &self,
        bounds_min: Point2<f64>,
        bounds_max: Point2<f64>,
        cell_size: f64,
        resolution: f64,
    ) -> PolygonTable {
        self.create_polygon_table_with(
            bounds_min,
            bounds_max,
            &PolygonTableParams::new(cell_size, resolution),
        )
    }

    /// Splits a region into square cells and extracts boundary polygons per cell.
    ///
    /// The table has `ceil(width / cell_size)` rows (row 0 at `bounds_max.x`,
    /// growing towards smaller x) and `ceil(height / cell_size)` columns.
    /// Each cell is rasterized on its own, inverted, and the outer contours
    /// of the resulting regions are mapped back to world coordinates at cell
    /// centers. Nested boundaries are not extracted and polygons are not
    /// stitched across cells.
    #[must_use]
    pub fn create_polygon_table_with(
        &self,
        bounds_min: Point2<f64>,
        bounds_max: Point2<f64>,
        params: &PolygonTableParams,
    ) -> PolygonTable {
        let (rows, columns) = self.table_dimensions(bounds_min, bounds_max, params);
        let mut table = PolygonTable::new(rows, columns);

        for row in 0..rows {
            for column in 0..columns {
                for polygon in self.cell_polygons(bounds_min, bounds_max, row, column, params) {
                    table.insert(row, column, polygon);
                }
            }
        }

        debug!(
            rows,
            columns,
            polygons = table.polygon_count(),
            "Created polygon table"
        );
        table
    }

    /// Parallel version of [`create_polygon_table_with`](Self::create_polygon_table_with).
    ///
    /// Cells are processed on the rayon thread pool; the result is identical
    /// to the sequential version.
    #[must_use]
    pub fn create_polygon_table_par(
        &self,
        bounds_min: Point2<f64>,
        bounds_max: Point2<f64>,
        params: &PolygonTableParams,
    ) -> PolygonTable
    where
        I: Sync,
    {
        let (rows, columns) = self.table_dimensions(bounds_min, bounds_max, params);
        let cells: Vec<Vec<Polygon>> = (0..rows * columns)
            .into_par_iter()
            .map(|i| self.cell_polygons(bounds_min, bounds_max, i / columns, i % columns, params))
            .collect();

        let table = PolygonTable::from_cells(rows, columns, cells);
        debug!(
            rows,
            columns,
            polygons = table.polygon_count(),
            "Created polygon table in parallel"
        );
        table
    }

    fn table_dimensions(
        &self,
        bounds_min: Point2<f64>,
        bounds_max: Point2<f64>,
        params: &PolygonTableParams,
    ) -> (usize, usize) {
        let bounds = Aabb2::from_min_max(bounds_min, bounds_max);
        cell_counts(&bounds, params.cell_size).map_or_else(
            || {
                warn!(
                    cell_size = params.cell_size,
                    triangles = self.triangles.len(),
                    max_cells = MAX_GRID_CELLS,
                    "Cannot partition region, returning empty table"
                );
                (0, 0)
            },
            |(rows, columns)| (rows as usize, columns as usize),
        )
    }

    fn cell_polygons(
        &self,
        bounds_min: Point2<f64>,
        bounds_max: Point2<f64>,
        row: usize,
        column: usize,
        params: &PolygonTableParams,
    ) -> Vec<Polygon> {
        let cell_size = params.cell_size;
        let resolution = params.resolution;
        let cell_min = Point2::new(
            bounds_max.x - (row + 1) as f64 * cell_size,
            bounds_min.y + column as f64 * cell_size,
        );
        let cell_max = Point2::new(
            bounds_max.x - row as f64 * cell_size,
            bounds_min.y + (column + 1) as f64 * cell_size,
        );

        let mut grid = self.create_occupancy_grid(cell_min, cell_max, resolution);
        grid.invert();

        trace_outer_contours(&grid, params.approximation)
            .into_iter()
            .map(|contour| {
                contour
                    .iter()
                    .map(|point| raster_to_world(cell_min, cell_max, resolution, *point))
                    .collect()
            })
            .collect()
    }

    /// Tests a polygon against the occupied surface.
    ///
    /// Returns `false` for polygons with fewer than 3 vertices. Otherwise
    /// returns `true` as soon as one candidate triangle satisfies
    /// [`polygon_polygon_intersects`], which only checks vertex containment.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::{OccupancyMap, Triangle2};
    /// use nalgebra::Point2;
    ///
    /// let map = OccupancyMap::build(vec![
    ///     Triangle2::from_arrays([0.0, 0.0], [10.0, 0.0], [0.0, 10.0]),
    /// ])
    /// .unwrap();
    ///
    /// let inside = [Point2::new(1.0, 1.0), Point2::new(2.0, 1.0), Point2::new(1.0, 2.0)];
    /// let outside = [Point2::new(8.0, 8.0), Point2::new(9.0, 8.0), Point2::new(8.0, 9.0)];
    /// assert!(map.intersects(&inside));
    /// assert!(!map.intersects(&outside));
    /// assert!(!map.intersects(&inside[..2]));
    /// ```
    #[must_use]
    pub fn intersects(&self, polygon: &[Point2<f64>]) -> bool {
        if polygon.len() < 3 {
            return false;
        }
        let Some(bounds) = polygon_bounds(polygon) else {
            return false;
        };

        self.index.query(&bounds).iter().any(|entry| {
            polygon_polygon_intersects(polygon, &self.triangles[entry.id].vertices())
        })
    }
}

/// Saturates for vertices far outside the region; the fill clips them.
fn world_to_raster(bounds: &Aabb2, resolution: f64, vertex: &Point2<f64>) -> RasterPoint {
    RasterPoint::new(
        ((bounds.max.x - vertex.x) / resolution).floor() as i64,
        ((vertex.y - bounds.min.y) / resolution).floor() as i64,
    )
}

/// Cell center of a raster point; the half-cell offset counters the
/// rasterizer's bias towards cell corners.
fn raster_to_world(
    cell_min: Point2<f64>,
    cell_max: Point2<f64>,
    resolution: f64,
    point: RasterPoint,
) -> Point2<f64> {
    Point2::new(
        (point.row as f64 + 0.5).mul_add(-resolution, cell_max.x),
        (point.column as f64 + 0.5).mul_add(resolution, cell_min.y),
    )
}
