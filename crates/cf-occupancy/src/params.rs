//! Index and vectorization parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for building a spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexParams {
    /// Maximum entries per BVH leaf node.
    pub max_leaf_size: usize,

    /// Subtrees with at least this many entries are built in parallel.
    pub parallel_threshold: usize,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            max_leaf_size: 8,
            parallel_threshold: 4096,
        }
    }
}

impl IndexParams {
    /// Parameters favoring query speed: small leaves.
    #[must_use]
    pub fn fine() -> Self {
        Self {
            max_leaf_size: 2,
            ..Default::default()
        }
    }

    /// Parameters that never build in parallel.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
            ..Default::default()
        }
    }

    /// Set maximum leaf size.
    #[must_use]
    pub const fn with_max_leaf_size(mut self, size: usize) -> Self {
        self.max_leaf_size = size;
        self
    }

    /// Set parallel build threshold.
    #[must_use]
    pub const fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}

/// How traced contours are reduced to polygon vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContourApproximation {
    /// Keep every border cell.
    None,
    /// Keep only the end points of horizontal, vertical and diagonal runs.
    #[default]
    Simple,
}

/// Parameters for polygon table generation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonTableParams {
    /// Side length of one table cell in world units.
    pub cell_size: f64,

    /// Raster resolution inside a cell, in world units per raster cell.
    pub resolution: f64,

    /// Contour point reduction.
    pub approximation: ContourApproximation,
}

impl Default for PolygonTableParams {
    fn default() -> Self {
        Self {
            cell_size: 50.0,
            resolution: 0.1,
            approximation: ContourApproximation::Simple,
        }
    }
}

impl PolygonTableParams {
    /// Create parameters for the given cell size and resolution.
    #[must_use]
    pub fn new(cell_size: f64, resolution: f64) -> Self {
        Self {
            cell_size,
            resolution,
            ..Default::default()
        }
    }

    /// Set contour approximation mode.
    #[must_use]
    pub const fn with_approximation(mut self, approximation: ContourApproximation) -> Self {
        self.approximation = approximation;
        self
    }

    /// Set cell size.
    #[must_use]
    pub const fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set raster resolution.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_index_params() {
        let params = IndexParams::default();
        assert_eq!(params.max_leaf_size, 8);
        assert!(params.parallel_threshold > params.max_leaf_size);
    }

    #[test]
    fn test_index_presets() {
        assert_eq!(IndexParams::fine().max_leaf_size, 2);
        assert_eq!(IndexParams::sequential().parallel_threshold, usize::MAX);
    }

    #[test]
    fn test_index_builder() {
        let params = IndexParams::default()
            .with_max_leaf_size(1)
            .with_parallel_threshold(16);
        assert_eq!(params.max_leaf_size, 1);
        assert_eq!(params.parallel_threshold, 16);
    }

    #[test]
    fn test_table_builder() {
        let params = PolygonTableParams::new(10.0, 0.5)
            .with_approximation(ContourApproximation::None)
            .with_cell_size(20.0);
        assert!((params.cell_size - 20.0).abs() < 1e-12);
        assert!((params.resolution - 0.5).abs() < 1e-12);
        assert_eq!(params.approximation, ContourApproximation::None);
        assert_eq!(
            PolygonTableParams::default().approximation,
            ContourApproximation::Simple
        );
    }
}
