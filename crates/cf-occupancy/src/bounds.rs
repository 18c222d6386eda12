//! Axis-aligned bounding rectangles on the ground plane.

use nalgebra::Point2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in 2D world coordinates.
///
/// Intervals are closed: boxes that only touch along an edge or corner
/// intersect.
///
/// # Example
///
/// ```
/// use cf_occupancy::Aabb2;
/// use nalgebra::Point2;
///
/// let aabb = Aabb2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
///
/// assert!(aabb.contains(&Point2::new(5.0, 5.0)));
/// assert!(!aabb.contains(&Point2::new(15.0, 5.0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb2 {
    /// Minimum corner of the bounding box.
    pub min: Point2<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point2<f64>,
}

impl Aabb2 {
    /// Creates a new AABB from two corners.
    ///
    /// The corners are automatically reordered if necessary.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::Aabb2;
    /// use nalgebra::Point2;
    ///
    /// let aabb = Aabb2::new(Point2::new(10.0, 0.0), Point2::new(0.0, 10.0));
    /// assert_eq!(aabb.min, Point2::new(0.0, 0.0));
    /// assert_eq!(aabb.max, Point2::new(10.0, 10.0));
    /// ```
    #[must_use]
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Creates an AABB from min and max corners without reordering.
    ///
    /// An inverted box (min > max on some axis) intersects nothing.
    #[must_use]
    pub const fn from_min_max(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    /// Creates an empty (inverted) bounding box, the identity for [`expand`](Self::expand).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }

    /// Creates the tightest box around a set of points.
    ///
    /// Returns `None` if `points` is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use cf_occupancy::Aabb2;
    /// use nalgebra::Point2;
    ///
    /// let aabb = Aabb2::from_points(&[
    ///     Point2::new(1.0, 5.0),
    ///     Point2::new(-2.0, 3.0),
    ///     Point2::new(4.0, -1.0),
    /// ])
    /// .unwrap();
    /// assert_eq!(aabb.min, Point2::new(-2.0, -1.0));
    /// assert_eq!(aabb.max, Point2::new(4.0, 5.0));
    /// ```
    #[must_use]
    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::from_min_max(*first, *first);
        for point in rest {
            aabb.expand_to_include(point);
        }
        Some(aabb)
    }

    /// Returns the extent along x.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Returns the extent along y.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns the center point of the box.
    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            f64::midpoint(self.min.x, self.max.x),
            f64::midpoint(self.min.y, self.max.y),
        )
    }

    /// Returns the index of the longest axis (0=X, 1=Y).
    #[must_use]
    pub fn longest_axis(&self) -> usize {
        usize::from(self.height() > self.width())
    }

    /// Checks if this box is valid (non-inverted).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// Checks if a point is inside the box. Points on the boundary are inside.
    #[must_use]
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Checks if this box intersects another box.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Expands this box to include another.
    pub fn expand(&mut self, other: &Self) {
        self.min.x = self.min.x.min(other.min.x);
        self.min.y = self.min.y.min(other.min.y);
        self.max.x = self.max.x.max(other.max.x);
        self.max.y = self.max.y.max(other.max.y);
    }

    /// Expands this box to include a point.
    pub fn expand_to_include(&mut self, point: &Point2<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }
}

impl Default for Aabb2 {
    fn default() -> Self {
        Self::new(Point2::origin(), Point2::origin())
    }
}
