//! Raster fill and contour tracing on occupancy grids.
//!
//! Two primitives connect geometry and rasters:
//!
//! - [`fill_triangle`] marks the cells covered by a triangle given in raster
//!   coordinates. The triangle is clipped to the grid and scan-converted
//!   with [`imageproc::drawing::draw_polygon_mut`].
//! - [`trace_outer_contours`] extracts the outer borders of the top-level
//!   8-connected occupied components with [`imageproc::contours::find_contours`].
//!
//! Raster coordinates are signed so that geometry partly outside the grid can
//! be passed through; cells outside the grid are clipped.

// Clipped coordinates lie within one cell of a grid of at most 2^30 cells
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use imageproc::contours::{BorderType, find_contours};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use crate::grid::{OCCUPIED, OccupancyGrid};
use crate::params::ContourApproximation;

/// A cell position in raster space. May lie outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterPoint {
    /// Row index.
    pub row: i64,
    /// Column index.
    pub column: i64,
}

impl RasterPoint {
    /// Create a raster point.
    #[must_use]
    pub const fn new(row: i64, column: i64) -> Self {
        Self { row, column }
    }

    const fn step_to(self, next: Self) -> (i64, i64) {
        (next.row - self.row, next.column - self.column)
    }
}

/// `[row, column]` in continuous raster space.
type Vertex = [f64; 2];

/// Intersection of segment `a`-`b` with the line `vertex[axis] == limit`.
fn crossing(a: Vertex, b: Vertex, axis: usize, limit: f64) -> Vertex {
    let other = 1 - axis;
    let t = (limit - a[axis]) / (b[axis] - a[axis]);
    let mut vertex = [0.0; 2];
    vertex[axis] = limit;
    vertex[other] = t.mul_add(b[other] - a[other], a[other]);
    vertex
}

/// Sutherland-Hodgman clip against the grid grown by one cell on each side.
///
/// The margin keeps clipped edges off the grid so they never mark cells the
/// unclipped triangle would not.
fn clip_to_grid(polygon: Vec<Vertex>, rows: f64, columns: f64) -> Vec<Vertex> {
    let planes = [
        (0, -1.0, false),
        (0, rows, true),
        (1, -1.0, false),
        (1, columns, true),
    ];
    planes
        .into_iter()
        .fold(polygon, |polygon, (axis, limit, upper)| {
            let inside = |v: &Vertex| {
                if upper {
                    v[axis] <= limit
                } else {
                    v[axis] >= limit
                }
            };
            let n = polygon.len();
            let mut clipped = Vec::with_capacity(n + 1);
            for (k, &current) in polygon.iter().enumerate() {
                let previous = polygon[(k + n - 1) % n];
                match (inside(&previous), inside(&current)) {
                    (true, true) => clipped.push(current),
                    (true, false) => clipped.push(crossing(previous, current, axis, limit)),
                    (false, true) => {
                        clipped.push(crossing(previous, current, axis, limit));
                        clipped.push(current);
                    }
                    (false, false) => {}
                }
            }
            clipped
        })
}

/// Marks every grid cell covered by a triangle given in raster coordinates.
///
/// The triangle is clipped to the grid first, so vertices may lie arbitrarily
/// far outside it. Interior rows are filled between edge crossings and the
/// edges are drawn as 8-connected lines. Degenerate triangles still mark
/// their edge lines.
///
/// # Example
///
/// ```
/// use cf_occupancy::{Aabb2, OccupancyGrid, RasterPoint, fill_triangle};
///
/// let mut grid = OccupancyGrid::new(5, 5, 1.0, Aabb2::default());
/// fill_triangle(
///     &mut grid,
///     [RasterPoint::new(0, 0), RasterPoint::new(0, 4), RasterPoint::new(4, 0)],
/// );
/// // Right isosceles triangle: 5 + 4 + 3 + 2 + 1 cells.
/// assert_eq!(grid.occupied_count(), 15);
/// ```
pub fn fill_triangle(grid: &mut OccupancyGrid, vertices: [RasterPoint; 3]) {
    if grid.is_empty() {
        return;
    }

    let rows = grid.rows() as f64;
    let columns = grid.columns() as f64;
    let polygon = vertices
        .iter()
        .map(|v| [v.row as f64, v.column as f64])
        .collect();

    let mut points: Vec<Point<i32>> = clip_to_grid(polygon, rows, columns)
        .into_iter()
        .map(|[row, column]| {
            Point::new(
                column.clamp(-1.0, columns).round() as i32,
                row.clamp(-1.0, rows).round() as i32,
            )
        })
        .collect();
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    match points.as_slice() {
        [] => {}
        [point] => {
            if let (Ok(row), Ok(column)) = (usize::try_from(point.y), usize::try_from(point.x)) {
                grid.set(row, column, true);
            }
        }
        _ => draw_polygon_mut(grid.image_mut(), &points, OCCUPIED),
    }
}

/// Traces the outer borders of top-level occupied components.
///
/// Occupied cells are foreground (8-connected); cells outside the grid are
/// free. Components nested inside a hole of another component are skipped,
/// as are all hole borders. Each contour is an open ring of border cells
/// starting at its first cell in row-major order.
///
/// # Example
///
/// ```
/// use cf_occupancy::{Aabb2, ContourApproximation, OccupancyGrid, RasterPoint, trace_outer_contours};
///
/// let mut grid = OccupancyGrid::new(4, 4, 1.0, Aabb2::default());
/// for row in 1..3 {
///     for column in 1..3 {
///         grid.set(row, column, true);
///     }
/// }
///
/// let contours = trace_outer_contours(&grid, ContourApproximation::Simple);
/// assert_eq!(contours.len(), 1);
/// assert_eq!(contours[0].len(), 4);
/// assert!(contours[0].contains(&RasterPoint::new(1, 1)));
/// ```
#[must_use]
pub fn trace_outer_contours(
    grid: &OccupancyGrid,
    approximation: ContourApproximation,
) -> Vec<Vec<RasterPoint>> {
    if grid.is_empty() {
        return Vec::new();
    }

    find_contours::<i64>(grid.image())
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .map(|contour| {
            let border: Vec<RasterPoint> = contour
                .points
                .iter()
                .map(|p| RasterPoint::new(p.y, p.x))
                .collect();
            approximate(border, approximation)
        })
        .collect()
}

/// Keeps only the ends of straight runs for [`ContourApproximation::Simple`].
fn approximate(border: Vec<RasterPoint>, approximation: ContourApproximation) -> Vec<RasterPoint> {
    let n = border.len();
    if approximation == ContourApproximation::None || n <= 2 {
        return border;
    }

    border
        .iter()
        .enumerate()
        .filter(|&(k, &cell)| {
            let previous = border[(k + n - 1) % n];
            let next = border[(k + 1) % n];
            previous.step_to(cell) != cell.step_to(next)
        })
        .map(|(_, &cell)| cell)
        .collect()
}
