//! Margin expansion applied around the simulation.
//!
//! Every rectangle is inflated by `m` on all four sides before the run and deflated
//! by the same `m` afterwards. `m` is fixed per rectangle when the transform is
//! created, so the inverse always undoes exactly what was applied even though
//! positions change in between.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::rectangle::RectangleSet;

/// How the `margin` option is interpreted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginType {
    /// Percent of each rectangle's own width
    #[default]
    Percentage,
    /// The same absolute distance for every rectangle
    Absolute,
}

impl FromStr for MarginType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "absolute" => Ok(Self::Absolute),
            other => Err(Error::UnknownMarginType(other.to_owned())),
        }
    }
}

impl fmt::Display for MarginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Percentage => "percentage",
            Self::Absolute => "absolute",
        })
    }
}

/// Per-rectangle margin widths, computed once from the unexpanded geometry
#[derive(Clone, Debug, PartialEq)]
pub struct MarginTransform {
    widths: Vec<f64>,
}

impl MarginTransform {
    /// Computes the margin of every rectangle in `set`
    pub fn new(set: &RectangleSet, margin: f64, kind: MarginType) -> Self {
        let widths = match kind {
            MarginType::Percentage => set.iter().map(|r| r.width * margin / 100.0).collect(),
            MarginType::Absolute => vec![margin; set.len()],
        };
        Self { widths }
    }

    /// Margin applied to the rectangle at `index`
    pub fn margin_of(&self, index: usize) -> f64 {
        self.widths[index]
    }

    /// Inflates every rectangle by its margin
    ///
    /// # Panics
    /// Panics if `set` is shorter than the set the transform was created from.
    pub fn expand(&self, set: &mut RectangleSet) {
        for (rect, &m) in set.as_mut_slice().iter_mut().zip(&self.widths) {
            rect.x -= m;
            rect.y -= m;
            rect.width += 2.0 * m;
            rect.height += 2.0 * m;
        }
    }

    /// Undoes [`expand`](Self::expand)
    pub fn contract(&self, set: &mut RectangleSet) {
        for (rect, &m) in set.as_mut_slice().iter_mut().zip(&self.widths) {
            rect.x += m;
            rect.y += m;
            rect.width -= 2.0 * m;
            rect.height -= 2.0 * m;
        }
    }

    /// Contracted copy of an expanded set, leaving `set` untouched
    #[must_use]
    pub fn contracted(&self, set: &RectangleSet) -> RectangleSet {
        let mut copy = set.clone();
        self.contract(&mut copy);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rectangle::Rectangle;

    fn sample() -> RectangleSet {
        vec![
            Rectangle::new(0.3, -1.7, 2.5, 1.0),
            Rectangle::new(10.0, 4.0, 0.0, 0.0),
            Rectangle::new(-5.25, 3.125, 7.1, 0.4),
        ]
        .into()
    }

    fn assert_close(a: &RectangleSet, b: &RectangleSet) {
        for (ra, rb) in a.iter().zip(b) {
            assert!((ra.x - rb.x).abs() < 1e-9, "x mismatch {ra:?} {rb:?}");
            assert!((ra.y - rb.y).abs() < 1e-9, "y mismatch {ra:?} {rb:?}");
            assert!((ra.width - rb.width).abs() < 1e-9, "width mismatch {ra:?} {rb:?}");
            assert!((ra.height - rb.height).abs() < 1e-9, "height mismatch {ra:?} {rb:?}");
        }
    }

    #[test]
    fn test_parse_margin_type() {
        assert_eq!("percentage".parse::<MarginType>(), Ok(MarginType::Percentage));
        assert_eq!("absolute".parse::<MarginType>(), Ok(MarginType::Absolute));
        assert_eq!(
            "pixels".parse::<MarginType>(),
            Err(Error::UnknownMarginType("pixels".into()))
        );
        assert_eq!(MarginType::Absolute.to_string(), "absolute");
    }

    #[test]
    fn test_percentage_uses_own_width() {
        let set = sample();
        let transform = MarginTransform::new(&set, 10.0, MarginType::Percentage);
        assert!((transform.margin_of(0) - 0.25).abs() < 1e-12);
        assert_eq!(transform.margin_of(1), 0.0);

        let mut expanded = set.clone();
        transform.expand(&mut expanded);
        assert!((expanded[0].width - 3.0).abs() < 1e-12);
        assert!((expanded[0].height - 1.5).abs() < 1e-12);
        assert!((expanded[0].x - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_absolute_is_uniform() {
        let set = sample();
        let transform = MarginTransform::new(&set, 0.5, MarginType::Absolute);
        let mut expanded = set.clone();
        transform.expand(&mut expanded);
        for (before, after) in set.iter().zip(&expanded) {
            assert_eq!(after.width, before.width + 1.0);
            assert_eq!(after.height, before.height + 1.0);
        }
    }

    #[test]
    fn test_round_trip_restores_geometry() {
        for kind in [MarginType::Percentage, MarginType::Absolute] {
            for margin in [0.0, 3.0, 12.5, 40.0] {
                let set = sample();
                let transform = MarginTransform::new(&set, margin, kind);
                let mut work = set.clone();
                transform.expand(&mut work);
                transform.contract(&mut work);
                assert_close(&work, &set);
            }
        }
    }

    #[test]
    fn test_contracted_copy_leaves_source() {
        let set = sample();
        let transform = MarginTransform::new(&set, 1.0, MarginType::Absolute);
        let mut expanded = set.clone();
        transform.expand(&mut expanded);
        let restored = transform.contracted(&expanded);
        assert_close(&restored, &set);
        assert_eq!(expanded[0].width, set[0].width + 2.0);
    }
}
