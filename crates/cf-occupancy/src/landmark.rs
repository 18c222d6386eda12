//! Landmark polygons filtered against an occupancy map.

use nalgebra::{Point3, Vector2};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::index::SpatialIndex;
use crate::map::OccupancyMap;
use crate::table::Polygon;

/// Ordered collection of landmark polygons in world coordinates.
///
/// # Example
///
/// ```
/// use cf_occupancy::{LandmarkMap, OccupancyMap, Triangle2};
/// use nalgebra::Point2;
///
/// let map = OccupancyMap::build(vec![
///     Triangle2::from_arrays([0.0, 0.0], [10.0, 0.0], [0.0, 10.0]),
/// ])
/// .unwrap();
///
/// let landmarks = LandmarkMap::from_polygons(vec![
///     vec![Point2::new(1.0, 1.0), Point2::new(2.0, 1.0), Point2::new(1.0, 2.0)],
///     vec![Point2::new(20.0, 20.0), Point2::new(21.0, 20.0), Point2::new(20.0, 21.0)],
/// ]);
///
/// let on_surface = landmarks.filter(&map);
/// assert_eq!(on_surface.len(), 1);
/// assert_eq!(on_surface.mesh_triangles(0.1).len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LandmarkMap {
    landmarks: Vec<Polygon>,
}

impl LandmarkMap {
    /// Wraps polygons already in world coordinates.
    #[must_use]
    pub const fn from_polygons(landmarks: Vec<Polygon>) -> Self {
        Self { landmarks }
    }

    /// Translates every vertex by `offset`.
    #[must_use]
    pub fn with_offset(mut landmarks: Vec<Polygon>, offset: Vector2<f64>) -> Self {
        for vertex in landmarks.iter_mut().flatten() {
            *vertex += offset;
        }
        Self { landmarks }
    }

    /// Landmarks in insertion order.
    #[must_use]
    pub fn landmarks(&self) -> &[Polygon] {
        &self.landmarks
    }

    /// Number of landmarks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    /// Returns `true` if there are no landmarks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Fan-triangulated render mesh at `z = height`.
    ///
    /// Each landmark with at least 3 vertices is split into the fan
    /// `(p0, p[k], p[k + 1])`, and every fan triangle is emitted twice with
    /// opposite winding. Shorter landmarks are skipped. The fan is only
    /// correct for convex or star-shaped landmarks.
    #[must_use]
    pub fn mesh_triangles(&self, height: f64) -> Vec<Point3<f64>> {
        let lift = |p: &nalgebra::Point2<f64>| Point3::new(p.x, p.y, height);

        let mut points = Vec::new();
        for landmark in &self.landmarks {
            let Some((first, rest)) = landmark.split_first() else {
                continue;
            };
            for pair in rest.windows(2) {
                let (a, b, c) = (lift(first), lift(&pair[0]), lift(&pair[1]));
                points.extend([a, b, c, c, b, a]);
            }
        }
        points
    }

    /// Keeps the landmarks that intersect the occupied surface, in order.
    #[must_use]
    pub fn filter<I: SpatialIndex>(&self, occupancy_map: &OccupancyMap<I>) -> Self {
        let landmarks: Vec<Polygon> = self
            .landmarks
            .iter()
            .filter(|landmark| occupancy_map.intersects(landmark))
            .cloned()
            .collect();

        debug!(
            kept = landmarks.len(),
            total = self.landmarks.len(),
            "Filtered landmarks"
        );
        Self { landmarks }
    }
}
