//! Text-label adapter.
//!
//! Hosts that draw text position each label by an anchor point rather than by its
//! lower-left corner. [`adjust_texts`] reads each label's box, runs the simulation,
//! and writes back the anchor point of the adjusted box.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rectangle::{Point, Rectangle, RectangleSet};
use crate::simulator::{AdjustOptions, Adjustment, adjust_labels};

/// Horizontal alignment of a label relative to its position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAnchor {
    /// Position is the left edge
    #[default]
    Left,
    /// Position is the horizontal centre
    Center,
    /// Position is the right edge
    Right,
}

/// Vertical alignment of a label relative to its position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    /// Position is the bottom edge
    #[default]
    Bottom,
    /// Position is the vertical centre
    Center,
    /// Position is the top edge
    Top,
}

/// Error for an alignment keyword that is not recognised
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown anchor `{0}`")]
pub struct ParseAnchorError(String);

impl FromStr for HorizontalAnchor {
    type Err = ParseAnchorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(ParseAnchorError(other.to_owned())),
        }
    }
}

impl FromStr for VerticalAnchor {
    type Err = ParseAnchorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bottom" | "baseline" => Ok(Self::Bottom),
            "center" => Ok(Self::Center),
            "top" => Ok(Self::Top),
            other => Err(ParseAnchorError(other.to_owned())),
        }
    }
}

impl fmt::Display for HorizontalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        })
    }
}

impl fmt::Display for VerticalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bottom => "bottom",
            Self::Center => "center",
            Self::Top => "top",
        })
    }
}

/// Horizontal and vertical alignment together
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    /// Horizontal alignment
    pub horizontal: HorizontalAnchor,
    /// Vertical alignment
    pub vertical: VerticalAnchor,
}

impl Anchor {
    /// Creates an anchor
    pub const fn new(horizontal: HorizontalAnchor, vertical: VerticalAnchor) -> Self {
        Self { horizontal, vertical }
    }

    /// The point of `rect` a host would use as the label position
    pub fn position(&self, rect: &Rectangle) -> Point {
        let x = match self.horizontal {
            HorizontalAnchor::Left => rect.x,
            HorizontalAnchor::Center => rect.x + rect.width / 2.0,
            HorizontalAnchor::Right => rect.x + rect.width,
        };
        let y = match self.vertical {
            VerticalAnchor::Bottom => rect.y,
            VerticalAnchor::Center => rect.y + rect.height / 2.0,
            VerticalAnchor::Top => rect.y + rect.height,
        };
        Point::new(x, y)
    }
}

/// A host text object that can be measured and moved
pub trait Label {
    /// On-screen bounding box in data coordinates
    fn bounding_box(&self) -> Rectangle;

    /// Alignment used when positioning the text
    fn anchor(&self) -> Anchor;

    /// Moves the text so that its anchor sits at `position`
    fn set_position(&mut self, position: Point);
}

/// Result of [`adjust_texts`]
#[derive(Clone, Debug, PartialEq)]
pub struct TextAdjustment {
    /// Anchor positions written back to the labels, in input order
    pub positions: Vec<Point>,
    /// The underlying rectangle adjustment
    pub adjustment: Adjustment,
}

/// Adjusts host labels so that their boxes stop overlapping
///
/// # Errors
/// Returns an error for invalid options or label geometry; no label is moved then.
pub fn adjust_texts<L: Label>(labels: &mut [L], options: &AdjustOptions) -> Result<TextAdjustment> {
    let boxes: RectangleSet = labels.iter().map(Label::bounding_box).collect();
    let adjustment = adjust_labels(&boxes, options)?;

    let mut positions = Vec::with_capacity(labels.len());
    for (label, rect) in labels.iter_mut().zip(adjustment.rectangles.iter()) {
        let position = label.anchor().position(rect);
        label.set_position(position);
        positions.push(position);
    }

    Ok(TextAdjustment { positions, adjustment })
}
