//! Broad-phase index abstraction.
//!
//! The simulator rebuilds its index from scratch every round, so an index only
//! has to support "create, insert everything, query many times". Two backends
//! implement [`SpatialIndex`]: [`QuadTree`](crate::QuadTree), the default, and
//! [`HilbertRTree`](crate::HilbertRTree).
//!
//! Every backend returns exactly the ids whose boxes intersect the query box
//! (edges inclusive), deduplicated and in ascending order. The simulator's
//! output therefore does not depend on which backend it runs with.

use serde::{Deserialize, Serialize};

use crate::rectangle::{Bounds, RectangleSet};

/// Default leaf capacity before a quadtree node subdivides
pub const DEFAULT_MAX_ITEMS_PER_NODE: usize = 10;
/// Default subdivision limit
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Construction parameters shared by all backends
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexParams {
    /// Items a leaf holds before it splits
    pub max_items_per_node: usize,
    /// Maximum subdivision depth; guarantees termination on duplicate boxes
    pub max_depth: usize,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            max_items_per_node: DEFAULT_MAX_ITEMS_PER_NODE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Bulk-built bounding-box index keyed by rectangle position
pub trait SpatialIndex {
    /// Creates an empty index covering `bounds`
    fn build(bounds: Bounds, params: &IndexParams) -> Self
    where
        Self: Sized;

    /// Adds one box under `id`; zero-area boxes are allowed
    fn insert(&mut self, id: usize, bbox: Bounds);

    /// Called once after the last insert, before any query
    fn finish(&mut self) {}

    /// Clears `results` and fills it with every id whose box intersects `bbox`,
    /// ascending and without duplicates. The id of a box equal to `bbox` is included.
    fn query(&self, bbox: &Bounds, results: &mut Vec<usize>);

    /// Number of inserted boxes
    fn len(&self) -> usize;

    /// Whether nothing was inserted
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds an index over the current geometry of `set`
    ///
    /// The covering bounds are the union of every rectangle; an empty set yields an
    /// empty index over a zero-size box at the origin.
    fn bulk_load(set: &RectangleSet, params: &IndexParams) -> Self
    where
        Self: Sized,
    {
        let bounds = set.bounds().unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0));
        let mut index = Self::build(bounds, params);
        for (id, rect) in set.iter().enumerate() {
            index.insert(id, rect.bounds());
        }
        index.finish();
        index
    }
}
