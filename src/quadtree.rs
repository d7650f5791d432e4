//! Region quadtree over bounding boxes.
//!
//! Nodes live in a flat arena and refer to their children by position. A box moves
//! down into a child only when it lies in that child's quadrant alone; a box touching
//! a centre line stays at the split node. Every id is therefore stored exactly once,
//! and a cluster of boxes on one centre line cannot make the tree split repeatedly.
//!
//! Quadrants are half-open planes split at the node centre, not clipped cells:
//! boxes outside the root bounds are still stored and found.

use crate::rectangle::{Bounds, Point};
use crate::spatial_index::{IndexParams, SpatialIndex};

/// Child slots: `[low x low y, low x high y, high x low y, high x high y]`
const CHILDREN: usize = 4;

#[derive(Clone, Debug)]
struct QuadNode {
    center: Point,
    width: f64,
    height: f64,
    depth: usize,
    items: Vec<(usize, Bounds)>,
    children: Option<[usize; CHILDREN]>,
}

impl QuadNode {
    fn new(center: Point, width: f64, height: f64, depth: usize) -> Self {
        QuadNode { center, width, height, depth, items: Vec::new(), children: None }
    }

    /// Child slots whose quadrant `bbox` touches, in slot order
    #[inline]
    fn quadrants(&self, bbox: &Bounds) -> [bool; CHILDREN] {
        let low_x = bbox.min_x <= self.center.x;
        let high_x = bbox.max_x >= self.center.x;
        let low_y = bbox.min_y <= self.center.y;
        let high_y = bbox.max_y >= self.center.y;
        [low_x && low_y, low_x && high_y, high_x && low_y, high_x && high_y]
    }
}

/// Quadtree spatial index
///
/// # Examples
/// ```
/// use labeladjust::prelude::*;
///
/// let mut tree = QuadTree::build(Bounds::new(0.0, 0.0, 10.0, 10.0), &IndexParams::default());
/// tree.insert(0, Bounds::new(0.0, 0.0, 1.0, 1.0));
/// tree.insert(1, Bounds::new(0.5, 0.5, 1.5, 1.5));
/// tree.insert(2, Bounds::new(8.0, 8.0, 9.0, 9.0));
///
/// let mut results = Vec::new();
/// tree.query(&Bounds::new(0.7, 0.7, 1.3, 1.3), &mut results);
/// assert_eq!(results, vec![0, 1]);
/// ```
#[derive(Clone, Debug)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
    max_items: usize,
    max_depth: usize,
    num_items: usize,
}

impl QuadTree {
    /// Number of nodes in the arena, for diagnostics
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest node level reached so far
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    fn insert_at(&mut self, node: usize, id: usize, bbox: Bounds) {
        if self.nodes[node].children.is_some() {
            self.insert_into_children(node, id, bbox);
            return;
        }
        let leaf = &mut self.nodes[node];
        leaf.items.push((id, bbox));
        if leaf.items.len() > self.max_items && leaf.depth < self.max_depth {
            self.split(node);
        }
    }

    fn insert_into_children(&mut self, node: usize, id: usize, bbox: Bounds) {
        let Some(children) = self.nodes[node].children else {
            self.nodes[node].items.push((id, bbox));
            return;
        };
        let touched = self.nodes[node].quadrants(&bbox);
        let mut slots = (0..CHILDREN).filter(|&slot| touched[slot]);
        match (slots.next(), slots.next()) {
            (Some(slot), None) => self.insert_at(children[slot], id, bbox),
            _ => self.nodes[node].items.push((id, bbox)),
        }
    }

    fn split(&mut self, node: usize) {
        let (center, width, height, depth) = {
            let n = &self.nodes[node];
            (n.center, n.width, n.height, n.depth)
        };
        let quarter_w = width / 4.0;
        let quarter_h = height / 4.0;
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        let x1 = center.x - quarter_w;
        let x2 = center.x + quarter_w;
        let y1 = center.y - quarter_h;
        let y2 = center.y + quarter_h;

        let first = self.nodes.len();
        for (cx, cy) in [(x1, y1), (x1, y2), (x2, y1), (x2, y2)] {
            self.nodes.push(QuadNode::new(Point::new(cx, cy), half_w, half_h, depth + 1));
        }
        self.nodes[node].children = Some([first, first + 1, first + 2, first + 3]);

        let items = std::mem::take(&mut self.nodes[node].items);
        for (id, bbox) in items {
            self.insert_into_children(node, id, bbox);
        }
    }
}

impl SpatialIndex for QuadTree {
    fn build(bounds: Bounds, params: &IndexParams) -> Self {
        let root = QuadNode::new(bounds.center(), bounds.width(), bounds.height(), 0);
        QuadTree {
            nodes: vec![root],
            max_items: params.max_items_per_node.max(1),
            max_depth: params.max_depth,
            num_items: 0,
        }
    }

    fn insert(&mut self, id: usize, bbox: Bounds) {
        self.insert_at(0, id, bbox);
        self.num_items += 1;
    }

    fn query(&self, bbox: &Bounds, results: &mut Vec<usize>) {
        results.clear();
        if self.num_items == 0 {
            return;
        }

        let mut stack = vec![0usize];
        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index];
            for (id, item) in &node.items {
                if item.intersects(bbox) {
                    results.push(*id);
                }
            }
            if let Some(children) = node.children {
                let touched = node.quadrants(bbox);
                for (slot, child) in children.into_iter().enumerate() {
                    if touched[slot] {
                        stack.push(child);
                    }
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
