//! Bounding-box spatial indices over triangle soup.
//!
//! The occupancy map only depends on the [`SpatialIndex`] capability: bulk
//! construction from `(box, id)` entries, box range queries and overall
//! bounds. [`Bvh`] is the default implementation; [`LinearIndex`] scans every
//! entry and serves as a reference.
//!
//! Query results are broad-phase candidates in index-internal order. Callers
//! must not depend on that order.

use rayon::join;
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb2;
use crate::error::{OccupancyError, OccupancyResult};
use crate::params::IndexParams;

/// A bounding box paired with the id of the item it bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexEntry {
    /// Bounding box of the item.
    pub bbox: Aabb2,
    /// Caller-defined id (the triangle index for occupancy maps).
    pub id: usize,
}

impl IndexEntry {
    /// Create a new entry.
    #[must_use]
    pub const fn new(bbox: Aabb2, id: usize) -> Self {
        Self { bbox, id }
    }
}

/// Capability required from a spatial index backing an occupancy map.
pub trait SpatialIndex: Sized {
    /// Bulk-build the index from all entries at once.
    ///
    /// # Errors
    ///
    /// Returns [`OccupancyError::InvalidInput`] if `entries` is empty.
    fn build(entries: Vec<IndexEntry>, params: &IndexParams) -> OccupancyResult<Self>;

    /// Returns every entry whose box intersects `query` (closed intervals).
    fn query(&self, query: &Aabb2) -> Vec<IndexEntry>;

    /// Returns the box spanning all entries.
    fn bounds(&self) -> Aabb2;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the index holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn require_entries(entries: &[IndexEntry]) -> OccupancyResult<()> {
    if entries.is_empty() {
        return Err(OccupancyError::InvalidInput(
            "spatial index requires at least one entry".to_string(),
        ));
    }
    Ok(())
}

/// BVH node containing either leaf entries or child nodes.
#[derive(Debug)]
enum BvhNode {
    Leaf {
        bbox: Aabb2,
        /// Positions into `Bvh::entries`.
        entries: SmallVec<[usize; 8]>,
    },
    Internal {
        bbox: Aabb2,
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl BvhNode {
    const fn bbox(&self) -> &Aabb2 {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Bounding volume hierarchy over 2D boxes.
///
/// Built top-down: each node splits its entries at the median box center
/// along the node's longest axis. Large subtrees are built in parallel.
///
/// # Example
///
/// ```
/// use cf_occupancy::{Aabb2, Bvh, IndexEntry, IndexParams, SpatialIndex};
/// use nalgebra::Point2;
///
/// let entries = vec![
///     IndexEntry::new(Aabb2::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)), 0),
///     IndexEntry::new(Aabb2::new(Point2::new(5.0, 5.0), Point2::new(6.0, 6.0)), 1),
/// ];
/// let bvh = Bvh::build(entries, &IndexParams::default()).unwrap();
///
/// let hits = bvh.query(&Aabb2::new(Point2::new(0.5, 0.5), Point2::new(2.0, 2.0)));
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].id, 0);
/// ```
#[derive(Debug)]
pub struct Bvh {
    entries: Vec<IndexEntry>,
    root: BvhNode,
}

impl Bvh {
    fn build_node(
        entries: &[IndexEntry],
        mut indices: Vec<usize>,
        params: &IndexParams,
    ) -> BvhNode {
        let mut bbox = Aabb2::empty();
        for &i in &indices {
            bbox.expand(&entries[i].bbox);
        }

        if indices.len() <= params.max_leaf_size.max(1) {
            return BvhNode::Leaf {
                bbox,
                entries: indices.into_iter().collect(),
            };
        }

        let axis = bbox.longest_axis();
        indices.sort_by(|&a, &b| {
            let ca = entries[a].bbox.center();
            let cb = entries[b].bbox.center();
            ca[axis].total_cmp(&cb[axis])
        });

        let parallel = indices.len() >= params.parallel_threshold;
        let right_indices = indices.split_off(indices.len() / 2);
        let left_indices = indices;

        let (left, right) = if parallel {
            join(
                || Self::build_node(entries, left_indices, params),
                || Self::build_node(entries, right_indices, params),
            )
        } else {
            (
                Self::build_node(entries, left_indices, params),
                Self::build_node(entries, right_indices, params),
            )
        };

        BvhNode::Internal {
            bbox,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn query_node(&self, node: &BvhNode, query: &Aabb2, result: &mut Vec<IndexEntry>) {
        if !node.bbox().intersects(query) {
            return;
        }
        match node {
            BvhNode::Leaf { entries, .. } => {
                result.extend(
                    entries
                        .iter()
                        .map(|&i| self.entries[i])
                        .filter(|entry| entry.bbox.intersects(query)),
                );
            }
            BvhNode::Internal { left, right, .. } => {
                self.query_node(left, query, result);
                self.query_node(right, query, result);
            }
        }
    }

    /// Get statistics about the tree structure.
    #[must_use]
    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats::default();
        Self::collect_stats(&self.root, 0, &mut stats);
        stats
    }

    fn collect_stats(node: &BvhNode, depth: usize, stats: &mut BvhStats) {
        stats.max_depth = stats.max_depth.max(depth);

        match node {
            BvhNode::Leaf { entries, .. } => {
                stats.leaf_count += 1;
                stats.total_entries_in_leaves += entries.len();
                stats.max_leaf_size = stats.max_leaf_size.max(entries.len());
            }
            BvhNode::Internal { left, right, .. } => {
                stats.internal_count += 1;
                Self::collect_stats(left, depth + 1, stats);
                Self::collect_stats(right, depth + 1, stats);
            }
        }
    }
}

impl SpatialIndex for Bvh {
    fn build(entries: Vec<IndexEntry>, params: &IndexParams) -> OccupancyResult<Self> {
        require_entries(&entries)?;
        let indices: Vec<usize> = (0..entries.len()).collect();
        let root = Self::build_node(&entries, indices, params);
        Ok(Self { entries, root })
    }

    fn query(&self, query: &Aabb2) -> Vec<IndexEntry> {
        let mut result = Vec::new();
        self.query_node(&self.root, query, &mut result);
        result
    }

    fn bounds(&self) -> Aabb2 {
        *self.root.bbox()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Statistics about BVH structure.
#[derive(Debug, Default, Clone)]
pub struct BvhStats {
    /// Number of internal (branch) nodes.
    pub internal_count: usize,
    /// Number of leaf nodes.
    pub leaf_count: usize,
    /// Maximum depth of the tree.
    pub max_depth: usize,
    /// Maximum number of entries in any leaf.
    pub max_leaf_size: usize,
    /// Total entries stored across all leaves.
    pub total_entries_in_leaves: usize,
}

/// Index that tests every entry on each query.
#[derive(Debug, Clone)]
pub struct LinearIndex {
    entries: Vec<IndexEntry>,
    bounds: Aabb2,
}

impl SpatialIndex for LinearIndex {
    fn build(entries: Vec<IndexEntry>, _params: &IndexParams) -> OccupancyResult<Self> {
        require_entries(&entries)?;
        let mut bounds = Aabb2::empty();
        for entry in &entries {
            bounds.expand(&entry.bbox);
        }
        Ok(Self { entries, bounds })
    }

    fn query(&self, query: &Aabb2) -> Vec<IndexEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.bbox.intersects(query))
            .copied()
            .collect()
    }

    fn bounds(&self) -> Aabb2 {
        self.bounds
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn entry(min: (f64, f64), max: (f64, f64), id: usize) -> IndexEntry {
        IndexEntry::new(
            Aabb2::new(Point2::new(min.0, min.1), Point2::new(max.0, max.1)),
            id,
        )
    }

    /// A 10x10 lattice of unit boxes spaced two units apart.
    fn lattice() -> Vec<IndexEntry> {
        let mut entries = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                let x = f64::from(i) * 2.0;
                let y = f64::from(j) * 2.0;
                entries.push(entry((x, y), (x + 1.0, y + 1.0), entries.len()));
            }
        }
        entries
    }

    fn sorted_ids(hits: Vec<IndexEntry>) -> Vec<usize> {
        let mut ids: Vec<usize> = hits.into_iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_build_empty_fails() {
        let err = Bvh::build(Vec::new(), &IndexParams::default()).unwrap_err();
        assert!(matches!(err, OccupancyError::InvalidInput(_)));
        assert!(LinearIndex::build(Vec::new(), &IndexParams::default()).is_err());
    }

    #[test]
    fn test_single_entry() {
        let bvh = Bvh::build(vec![entry((0.0, 0.0), (1.0, 1.0), 7)], &IndexParams::default())
            .unwrap();
        assert_eq!(bvh.len(), 1);
        assert!(!bvh.is_empty());

        let hits = bvh.query(&Aabb2::new(Point2::new(0.5, 0.5), Point2::new(0.6, 0.6)));
        assert_eq!(sorted_ids(hits), vec![7]);
    }

    #[test]
    fn test_bounds() {
        let bvh = Bvh::build(lattice(), &IndexParams::default()).unwrap();
        let bounds = bvh.bounds();
        assert_eq!(bounds.min, Point2::new(0.0, 0.0));
        assert_eq!(bounds.max, Point2::new(19.0, 19.0));
    }

    #[test]
    fn test_query_partial() {
        let bvh = Bvh::build(lattice(), &IndexParams::fine()).unwrap();

        // Covers boxes (1,1), (1,2), (2,1), (2,2) in lattice coordinates.
        let hits = bvh.query(&Aabb2::new(Point2::new(2.5, 2.5), Point2::new(4.5, 4.5)));
        assert_eq!(sorted_ids(hits), vec![11, 12, 21, 22]);
    }

    #[test]
    fn test_query_touching_edge() {
        let bvh = Bvh::build(lattice(), &IndexParams::default()).unwrap();
        let hits = bvh.query(&Aabb2::new(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0)));
        assert_eq!(sorted_ids(hits), vec![0]);
    }

    #[test]
    fn test_query_none() {
        let bvh = Bvh::build(lattice(), &IndexParams::default()).unwrap();
        let hits = bvh.query(&Aabb2::new(Point2::new(100.0, 100.0), Point2::new(101.0, 101.0)));
        assert!(hits.is_empty());

        // Gap between lattice boxes.
        let hits = bvh.query(&Aabb2::new(Point2::new(1.2, 1.2), Point2::new(1.8, 1.8)));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_stats() {
        let bvh = Bvh::build(lattice(), &IndexParams::default().with_max_leaf_size(4)).unwrap();
        let stats = bvh.stats();
        assert_eq!(stats.total_entries_in_leaves, 100);
        assert!(stats.max_leaf_size <= 4);
        assert_eq!(stats.leaf_count, stats.internal_count + 1);
        assert!(stats.max_depth >= 5);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let query = Aabb2::new(Point2::new(3.0, -1.0), Point2::new(11.0, 7.5));
        let sequential = Bvh::build(lattice(), &IndexParams::sequential()).unwrap();
        let parallel = Bvh::build(
            lattice(),
            &IndexParams::default()
                .with_max_leaf_size(2)
                .with_parallel_threshold(4),
        )
        .unwrap();

        assert_eq!(
            sorted_ids(sequential.query(&query)),
            sorted_ids(parallel.query(&query))
        );
    }

    #[test]
    fn test_linear_matches_bvh() {
        let bvh = Bvh::build(lattice(), &IndexParams::fine()).unwrap();
        let linear = LinearIndex::build(lattice(), &IndexParams::default()).unwrap();
        assert_eq!(bvh.bounds(), linear.bounds());

        for k in 0..20 {
            let t = f64::from(k);
            let query = Aabb2::new(Point2::new(t - 0.5, 0.3 * t), Point2::new(t + 2.0, t + 1.0));
            assert_eq!(
                sorted_ids(bvh.query(&query)),
                sorted_ids(linear.query(&query))
            );
        }
    }

    #[test]
    fn test_duplicate_boxes() {
        let entries = (0..20).map(|i| entry((0.0, 0.0), (1.0, 1.0), i)).collect();
        let bvh = Bvh::build(entries, &IndexParams::fine()).unwrap();
        let hits = bvh.query(&Aabb2::new(Point2::new(0.0, 0.0), Point2::new(0.1, 0.1)));
        assert_eq!(hits.len(), 20);
    }
}
