//! 2D occupancy engine over ground-plane triangles.
//!
//! This crate turns a triangle soup describing occupied (drivable) surface
//! into the representations that planners and simulators consume:
//!
//! - [`OccupancyMap`] - Immutable triangle store with a bounding-box index
//! - [`OccupancyGrid`] - Dense boolean raster of a world rectangle
//! - [`PolygonTable`] - Per-cell boundary polygons of a world rectangle
//! - [`LandmarkMap`] - Landmark polygons filtered against the surface
//! - [`SpatialIndex`] - Index capability, implemented by [`Bvh`] and [`LinearIndex`]
//!
//! # Coordinate Systems
//!
//! All geometry is 2D in world units (`f64`). Rasters use a mirrored layout:
//! - Rows: world x, *decreasing* (row 0 at the rectangle's max x)
//! - Columns: world y, increasing (column 0 at the rectangle's min y)
//!
//! Row counts derive from the x extent, column counts from the y extent.
//! [`OccupancyGrid::cell_center`] and [`OccupancyGrid::world_to_cell`] convert
//! between the two spaces.
//!
//! # Example
//!
//! ```
//! use cf_occupancy::{OccupancyMap, Triangle2};
//! use nalgebra::Point2;
//!
//! // A 4x4 square made of two triangles
//! let map = OccupancyMap::build(vec![
//!     Triangle2::from_arrays([2.0, 2.0], [6.0, 2.0], [6.0, 6.0]),
//!     Triangle2::from_arrays([2.0, 2.0], [6.0, 6.0], [2.0, 6.0]),
//! ])
//! .unwrap();
//!
//! // Broad-phase query by rectangle
//! let hits = map.query_intersect(Point2::new(0.0, 0.0), Point2::new(3.0, 3.0));
//! assert_eq!(hits.len(), 2);
//!
//! // Rasterize at one cell per world unit
//! let grid = map.create_occupancy_grid(Point2::new(0.0, 0.0), Point2::new(8.0, 8.0), 1.0);
//! assert_eq!(grid.occupied_count(), 25);
//! ```
//!
//! # Polygon Tables
//!
//! A polygon table splits a rectangle into square cells and outlines the free
//! regions of each cell:
//!
//! ```
//! use cf_occupancy::{OccupancyMap, PolygonTableParams, Triangle2};
//! use nalgebra::Point2;
//!
//! let map = OccupancyMap::build(vec![
//!     Triangle2::from_arrays([2.0, 2.0], [6.0, 2.0], [6.0, 6.0]),
//!     Triangle2::from_arrays([2.0, 2.0], [6.0, 6.0], [2.0, 6.0]),
//! ])
//! .unwrap();
//!
//! let params = PolygonTableParams::new(4.0, 0.5);
//! let table = map.create_polygon_table_with(Point2::new(0.0, 0.0), Point2::new(8.0, 8.0), &params);
//! assert_eq!((table.rows(), table.columns()), (2, 2));
//!
//! // Same result on the rayon thread pool
//! let parallel = map.create_polygon_table_par(Point2::new(0.0, 0.0), Point2::new(8.0, 8.0), &params);
//! assert_eq!(table, parallel);
//! ```
//!
//! # Intersection
//!
//! [`OccupancyMap::intersects`] reports whether a polygon touches the
//! surface using vertex containment only. Shapes that overlap purely through
//! crossing edges are not detected.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bounds;
mod error;
mod grid;
mod index;
mod landmark;
mod map;
mod params;
mod polygon;
mod raster;
mod table;
mod triangle;

// Re-export core types
pub use bounds::Aabb2;
pub use error::{OccupancyError, OccupancyResult};
pub use grid::{MAX_GRID_CELLS, OccupancyGrid};
pub use index::{Bvh, BvhStats, IndexEntry, LinearIndex, SpatialIndex};
pub use landmark::LandmarkMap;
pub use map::OccupancyMap;
pub use params::{ContourApproximation, IndexParams, PolygonTableParams};
pub use polygon::{point_in_polygon, polygon_area, polygon_bounds, polygon_polygon_intersects};
pub use raster::{RasterPoint, fill_triangle, trace_outer_contours};
pub use table::{Polygon, PolygonTable};
pub use triangle::Triangle2;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2};
