//! # labeladjust - overlap removal for label boxes
//!
//! Repositions a set of axis-aligned rectangles (typically text label bounding
//! boxes) so that they stop overlapping, using a fixed number of rounds of
//! pairwise repulsion. Each round rebuilds a spatial index for broad-phase
//! candidate lookup.
//!
//! ## Features
//!
//! - **Fixed budget**: runs exactly `max_iterations` rounds, cost is predictable
//! - **Two repulsion tests**: a size-based sphere test and an axis penetration test
//! - **Margins**: inflate labels during the run for extra clearance, as a percentage
//!   of each width or an absolute distance
//! - **Deterministic**: jitter comes from an explicitly seeded generator
//! - **Pluggable index**: quadtree by default, packed Hilbert R-tree as an alternative
//!
//! ## Quick Start
//!
//! ```rust
//! use labeladjust::prelude::*;
//!
//! // Two labels stacked on top of each other and a distant one
//! let labels: RectangleSet = vec![
//!     Rectangle::new(0.0, 0.0, 4.0, 1.0),
//!     Rectangle::new(0.0, 0.0, 4.0, 1.0),
//!     Rectangle::new(20.0, 20.0, 4.0, 1.0),
//! ]
//! .into();
//!
//! let options = AdjustOptions::default().with_seed(42).with_max_iterations(200);
//! let result = adjust_labels(&labels, &options).unwrap();
//!
//! // Sizes never change, only positions
//! for (before, after) in labels.iter().zip(&result.rectangles) {
//!     assert_eq!(before.width, after.width);
//!     assert_eq!(before.height, after.height);
//! }
//! assert!(!result.rectangles[0].overlaps(&result.rectangles[1]));
//! assert_eq!(result.rectangles[2], labels[2]);
//! ```
//!
//! ## How It Works
//!
//! Every round, for each rectangle `i` in index order, the index returns the
//! rectangles whose boxes touch `i`'s box. For each such `j` the repulsion rule
//! may move `j` (never `i`) away from `i`. Moves take effect immediately, so the
//! result depends on input order; see [`simulator`] for the exact contract.
//!
//! The loop does not look for convergence. Dense inputs may still overlap after
//! the last round; raise `max_iterations` or `speed` if they do.

pub mod anchor;
pub mod diagnostics;
pub mod error;
pub mod hilbert_rtree;
pub mod margin;
pub mod prelude;
pub mod quadtree;
pub mod rectangle;
pub mod repulsion;
pub mod simulator;
pub mod spatial_index;

#[cfg(feature = "cli")]
pub mod cli;

pub use anchor::{Anchor, HorizontalAnchor, Label, TextAdjustment, VerticalAnchor, adjust_texts};
pub use error::{Error, Result};
pub use hilbert_rtree::HilbertRTree;
pub use margin::{MarginTransform, MarginType};
pub use quadtree::QuadTree;
pub use rectangle::{Bounds, Point, Rectangle, RectangleSet};
pub use repulsion::{Repulsion, RepulsionParams, repulse};
pub use simulator::{
    AdjustOptions, Adjustment, ForceSimulator, IterationReport, Observer, SimulationStats,
    adjust_labels, adjust_labels_with,
};
pub use spatial_index::{IndexParams, SpatialIndex};

mod comparison_tests;
