//! Ground-plane triangle type.

use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb2;

/// A triangle on the ground plane with concrete vertex positions.
///
/// No winding order is enforced. Degenerate (zero-area) triangles can be
/// constructed but carry no meaning for intersection tests.
///
/// # Example
///
/// ```
/// use cf_occupancy::Triangle2;
/// use nalgebra::Point2;
///
/// let tri = Triangle2::new(
///     Point2::new(0.0, 0.0),
///     Point2::new(2.0, 0.0),
///     Point2::new(0.0, 2.0),
/// );
///
/// assert!((tri.area() - 2.0).abs() < 1e-10);
/// assert_eq!(tri.bounds().max, Point2::new(2.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle2 {
    /// First vertex.
    pub v0: Point2<f64>,
    /// Second vertex.
    pub v1: Point2<f64>,
    /// Third vertex.
    pub v2: Point2<f64>,
}

impl Triangle2 {
    /// Create a new triangle from three points.
    #[inline]
    #[must_use]
    pub const fn new(v0: Point2<f64>, v1: Point2<f64>, v2: Point2<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Create a triangle from coordinate arrays.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::Triangle2;
    ///
    /// let tri = Triangle2::from_arrays([0.0, 0.0], [1.0, 0.0], [0.0, 1.0]);
    /// assert!((tri.area() - 0.5).abs() < 1e-10);
    /// ```
    #[inline]
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point2::new is not const in nalgebra
    pub fn from_arrays(v0: [f64; 2], v1: [f64; 2], v2: [f64; 2]) -> Self {
        Self {
            v0: Point2::new(v0[0], v0[1]),
            v1: Point2::new(v1[0], v1[1]),
            v2: Point2::new(v2[0], v2[1]),
        }
    }

    /// Returns the vertices as an array, in storage order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [Point2<f64>; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Per-axis min/max over the three vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb2 {
        Aabb2::from_min_max(
            Point2::new(
                self.v0.x.min(self.v1.x).min(self.v2.x),
                self.v0.y.min(self.v1.y).min(self.v2.y),
            ),
            Point2::new(
                self.v0.x.max(self.v1.x).max(self.v2.x),
                self.v0.y.max(self.v1.y).max(self.v2.y),
            ),
        )
    }

    /// Signed area; positive for counter-clockwise winding.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        0.5 * e1.perp(&e2)
    }

    /// Unsigned area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Average of the three vertices.
    #[must_use]
    pub fn centroid(&self) -> Point2<f64> {
        Point2::new(
            (self.v0.x + self.v1.x + self.v2.x) / 3.0,
            (self.v0.y + self.v1.y + self.v2.y) / 3.0,
        )
    }

    /// Checks if the triangle has (near) zero area.
    #[must_use]
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        self.area() <= epsilon
    }
}
