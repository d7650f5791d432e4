//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the crate.
//! Users can import everything they need with:
//!
//! ```
//! use labeladjust::prelude::*;
//! ```

pub use crate::{
    AdjustOptions, Adjustment, Bounds, ForceSimulator, HilbertRTree, IndexParams, IterationReport,
    MarginType, Observer, Point, QuadTree, Rectangle, RectangleSet, SpatialIndex, adjust_labels,
    adjust_labels_with,
};
