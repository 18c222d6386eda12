//! Polygon predicates used for surface intersection tests.
//!
//! Polygons are open rings of [`Point2`] vertices: the edge from the last
//! vertex back to the first is implicit.
//!
//! # Boundary behavior
//!
//! [`point_in_polygon`] is the classic crossing-number test. Points lying
//! exactly on an edge or vertex land on whichever side the floating-point
//! comparison picks; callers must not rely on boundary inclusion.
//!
//! [`polygon_polygon_intersects`] only checks vertex containment. Two shapes
//! that overlap purely through crossing edges (a plus sign made of two thin
//! rectangles, for example) are reported as disjoint.

use nalgebra::Point2;

use crate::bounds::Aabb2;

/// Crossing-number point-in-polygon test.
///
/// Casts a horizontal ray from `point` towards +x and counts the polygon
/// edges it crosses; the point is inside iff the count is odd.
///
/// # Example
///
/// ```
/// use cf_occupancy::point_in_polygon;
/// use nalgebra::Point2;
///
/// let square = [
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(1.0, 1.0),
///     Point2::new(0.0, 1.0),
/// ];
/// assert!(point_in_polygon(&square, &Point2::new(0.5, 0.5)));
/// assert!(!point_in_polygon(&square, &Point2::new(2.0, 2.0)));
/// ```
#[must_use]
pub fn point_in_polygon(vertices: &[Point2<f64>], point: &Point2<f64>) -> bool {
    let Some(mut j) = vertices.len().checked_sub(1) else {
        return false;
    };

    let mut inside = false;
    for (i, vi) in vertices.iter().enumerate() {
        let vj = &vertices[j];
        if (vi.y > point.y) != (vj.y > point.y) {
            let crossing_x = (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x;
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Returns `true` if any vertex of `a` lies inside `b` or any vertex of `b`
/// lies inside `a`.
///
/// This is a necessary but not sufficient overlap test; see the module docs.
///
/// # Example
///
/// ```
/// use cf_occupancy::polygon_polygon_intersects;
/// use nalgebra::Point2;
///
/// let big = [
///     Point2::new(0.0, 0.0),
///     Point2::new(4.0, 0.0),
///     Point2::new(4.0, 4.0),
///     Point2::new(0.0, 4.0),
/// ];
/// let small = [
///     Point2::new(1.0, 1.0),
///     Point2::new(2.0, 1.0),
///     Point2::new(1.5, 2.0),
/// ];
/// assert!(polygon_polygon_intersects(&big, &small));
/// assert!(polygon_polygon_intersects(&small, &big));
/// ```
#[must_use]
pub fn polygon_polygon_intersects(a: &[Point2<f64>], b: &[Point2<f64>]) -> bool {
    a.iter().any(|point| point_in_polygon(b, point))
        || b.iter().any(|point| point_in_polygon(a, point))
}

/// Axis-aligned bounds of a polygon, or `None` if it has no vertices.
#[must_use]
pub fn polygon_bounds(vertices: &[Point2<f64>]) -> Option<Aabb2> {
    Aabb2::from_points(vertices)
}

/// Unsigned area of a simple polygon (shoelace formula).
///
/// Returns 0 for fewer than 3 vertices.
#[must_use]
pub fn polygon_area(vertices: &[Point2<f64>]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for (i, vi) in vertices.iter().enumerate() {
        let vj = &vertices[(i + 1) % vertices.len()];
        twice_area += vi.x.mul_add(vj.y, -(vj.x * vi.y));
    }
    twice_area.abs() / 2.0
}
