//! Packed Hilbert R-tree, following the flatbush layout.
//!
//! Leaves are sorted by the Hilbert index of their centres and packed bottom-up into
//! nodes of `node_size` children. All node boxes live in one flat vector:
//! leaves occupy positions `[0, num_items)`, parent levels are appended after.

use crate::rectangle::Bounds;
use crate::spatial_index::{IndexParams, SpatialIndex};

const MAX_HILBERT: u32 = u16::MAX as u32;
const DEFAULT_NODE_SIZE: usize = 16;

/// Hilbert R-tree for spatial queries
///
/// Must be finished (see [`SpatialIndex::finish`]) before it can be queried;
/// [`SpatialIndex::bulk_load`] does this for you.
#[derive(Clone, Debug)]
pub struct HilbertRTree {
    /// Node boxes: leaves first, then each parent level
    boxes: Vec<Bounds>,
    /// Leaf: item id. Parent: position of its first child
    indices: Vec<usize>,
    /// End position of each tree level
    level_bounds: Vec<usize>,
    /// Children per parent node
    node_size: usize,
    /// Number of leaf items
    num_items: usize,
    /// Bounding box of all items
    bounds: Bounds,
    built: bool,
}

impl HilbertRTree {
    /// Creates an empty tree with the given fan-out
    pub fn with_node_size(node_size: usize) -> Self {
        HilbertRTree {
            boxes: Vec::new(),
            indices: Vec::new(),
            level_bounds: Vec::new(),
            node_size: node_size.max(2),
            num_items: 0,
            bounds: Bounds::empty(),
            built: false,
        }
    }

    /// Creates an empty tree with the default fan-out of 16
    pub fn new() -> Self {
        Self::with_node_size(DEFAULT_NODE_SIZE)
    }

    /// Children per parent node
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Number of levels including the leaves, zero before finishing
    pub fn height(&self) -> usize {
        self.level_bounds.len()
    }

    /// Finds the end of the level containing `pos`
    #[inline]
    fn upper_bound(&self, pos: usize) -> usize {
        self.level_bounds
            .iter()
            .copied()
            .find(|&bound| bound > pos)
            .unwrap_or(self.boxes.len())
    }

    fn sort_leaves(&mut self) {
        let width = self.bounds.width();
        let height = self.bounds.height();
        let scale_x = if width > 0.0 { f64::from(MAX_HILBERT) / width } else { 0.0 };
        let scale_y = if height > 0.0 { f64::from(MAX_HILBERT) / height } else { 0.0 };
        let limit = f64::from(MAX_HILBERT) - 1.0;

        let hilbert_values: Vec<u32> = self
            .boxes
            .iter()
            .map(|b| {
                let center = b.center();
                let hx = ((center.x - self.bounds.min_x) * scale_x).clamp(0.0, limit) as u32;
                let hy = ((center.y - self.bounds.min_y) * scale_y).clamp(0.0, limit) as u32;
                hilbert_xy_to_index(hx, hy)
            })
            .collect();

        let mut order: Vec<usize> = (0..self.num_items).collect();
        order.sort_by_key(|&i| hilbert_values[i]);
        self.boxes = order.iter().map(|&i| self.boxes[i]).collect();
        self.indices = order.iter().map(|&i| self.indices[i]).collect();
    }
}

impl Default for HilbertRTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialIndex for HilbertRTree {
    fn build(_bounds: Bounds, params: &IndexParams) -> Self {
        // Hilbert ordering needs the exact extent of the centres, so the tree tracks
        // its own bounds as boxes arrive instead of trusting the caller's.
        Self::with_node_size(params.max_items_per_node)
    }

    fn insert(&mut self, id: usize, bbox: Bounds) {
        self.boxes.truncate(self.num_items);
        self.indices.truncate(self.num_items);
        self.level_bounds.clear();
        self.built = false;

        self.boxes.push(bbox);
        self.indices.push(id);
        self.bounds.extend(&bbox);
        self.num_items += 1;
    }

    fn finish(&mut self) {
        if self.built || self.num_items == 0 {
            return;
        }
        self.sort_leaves();

        let node_size = self.node_size;
        let mut level_bounds = vec![self.num_items];
        let mut count = self.num_items;
        let mut total = self.num_items;
        loop {
            count = count.div_ceil(node_size);
            total += count;
            level_bounds.push(total);
            if count <= 1 {
                break;
            }
        }

        // Build parent levels
        let mut pos = 0usize;
        for &level_end in &level_bounds[..level_bounds.len() - 1] {
            while pos < level_end {
                let first = pos;
                let end = (pos + node_size).min(level_end);
                let mut node_box = Bounds::empty();
                for child in &self.boxes[pos..end] {
                    node_box.extend(child);
                }
                self.boxes.push(node_box);
                self.indices.push(first);
                pos = end;
            }
        }

        self.level_bounds = level_bounds;
        self.built = true;
    }

    fn query(&self, bbox: &Bounds, results: &mut Vec<usize>) {
        results.clear();
        if !self.built || self.num_items == 0 {
            return;
        }

        let mut stack = vec![self.boxes.len() - 1];
        while let Some(node) = stack.pop() {
            let first = self.indices[node];
            let end = (first + self.node_size).min(self.upper_bound(first));
            for pos in first..end {
                if !self.boxes[pos].intersects(bbox) {
                    continue;
                }
                if pos < self.num_items {
                    results.push(self.indices[pos]);
                } else {
                    stack.push(pos);
                }
            }
        }

        results.sort_unstable();
        results.dedup();
    }

    fn len(&self) -> usize {
        self.num_items
    }
}

/// Hilbert curve index computation
/// From https://github.com/rawrunprotected/hilbert_curves (public domain)
fn interleave(mut x: u32) -> u32 {
    x = (x | (x << 8)) & 0x00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333;
    x = (x | (x << 1)) & 0x5555_5555;
    x
}

#[allow(non_snake_case, reason = "names follow the reference prefix-scan derivation")]
fn hilbert_xy_to_index(x: u32, y: u32) -> u32 {
    // Initial prefix scan round, prime with x and y
    let mut a = x ^ y;
    let mut b = 0xFFFF ^ a;
    let mut c = 0xFFFF ^ (x | y);
    let mut d = x & (y ^ 0xFFFF);
    let mut A = a | (b >> 1);
    let mut B = (a >> 1) ^ a;
    let mut C = ((c >> 1) ^ (b & (d >> 1))) ^ c;
    let mut D = ((a & (c >> 1)) ^ (d >> 1)) ^ d;

    for shift in [2, 4] {
        a = A;
        b = B;
        c = C;
        d = D;
        A = (a & (a >> shift)) ^ (b & (b >> shift));
        B = (a & (b >> shift)) ^ (b & ((a ^ b) >> shift));
        C ^= (a & (c >> shift)) ^ (b & (d >> shift));
        D ^= (b & (c >> shift)) ^ ((a ^ b) & (d >> shift));
    }

    // Final round and projection
    a = A;
    b = B;
    c = C;
    d = D;
    C ^= (a & (c >> 8)) ^ (b & (d >> 8));
    D ^= (b & (c >> 8)) ^ ((a ^ b) & (d >> 8));

    // Undo transformation prefix scan
    a = C ^ (C >> 1);
    b = D ^ (D >> 1);

    // Recover index bits
    let i0 = x ^ y;
    let i1 = b | (0xFFFF ^ (i0 | a));

    (interleave(i1) << 1) | interleave(i0)
}
