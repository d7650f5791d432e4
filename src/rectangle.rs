//! Rectangle data model.
//!
//! A [`RectangleSet`] is an ordered array of [`Rectangle`] records. A rectangle's
//! identity is its position in the set; the spatial index and the simulator refer
//! to rectangles by that position only.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Axis-aligned rectangle anchored at its lower-left corner
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Lower-left x
    pub x: f64,
    /// Lower-left y
    pub y: f64,
    /// Extent along x, never negative
    pub width: f64,
    /// Extent along y, never negative
    pub height: f64,
}

impl Rectangle {
    /// Creates a rectangle from its lower-left corner and size
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Center of the rectangle
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Bounding box as (min, max) corners
    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Larger of width and height, the diameter used by the sphere test
    #[inline]
    pub fn size(&self) -> f64 {
        self.width.max(self.height)
    }

    /// True when the interiors overlap; touching edges do not count
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x + self.width > other.x
            && other.x + other.width > self.x
            && self.y + self.height > other.y
            && other.y + other.height > self.y
    }

    /// Moves the rectangle without changing its size
    #[inline]
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// x coordinate
    pub x: f64,
    /// y coordinate
    pub y: f64,
}

impl Point {
    /// Creates a point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Box structure: minX, minY, maxX, maxY
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum x
    pub min_x: f64,
    /// Minimum y
    pub min_y: f64,
    /// Maximum x
    pub max_x: f64,
    /// Maximum y
    pub max_y: f64,
}

impl Bounds {
    /// Creates a box from its corners
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// An inverted box that any `extend` call replaces
    pub const fn empty() -> Self {
        Self::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY)
    }

    /// Grows the box to cover `other`
    #[inline]
    pub fn extend(&mut self, other: &Self) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Inclusive intersection test: boxes sharing only an edge or corner intersect
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Width of the box
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the box
    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center of the box
    #[inline]
    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Ordered collection of rectangles, addressed by position
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RectangleSet {
    rects: Vec<Rectangle>,
}

impl RectangleSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with room for `capacity` rectangles
    pub fn with_capacity(capacity: usize) -> Self {
        Self { rects: Vec::with_capacity(capacity) }
    }

    /// Appends a rectangle; its identity is the previous length
    pub fn push(&mut self, rect: Rectangle) {
        self.rects.push(rect);
    }

    /// Number of rectangles
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Rectangle at `index`
    pub fn get(&self, index: usize) -> Option<&Rectangle> {
        self.rects.get(index)
    }

    /// Iterates in index order
    pub fn iter(&self) -> std::slice::Iter<'_, Rectangle> {
        self.rects.iter()
    }

    /// Borrowed view of the rectangles
    pub fn as_slice(&self) -> &[Rectangle] {
        &self.rects
    }

    /// Mutable view of the rectangles
    pub fn as_mut_slice(&mut self) -> &mut [Rectangle] {
        &mut self.rects
    }

    /// Unwraps into the underlying vector
    pub fn into_vec(self) -> Vec<Rectangle> {
        self.rects
    }

    /// Centers of every rectangle, in index order
    pub fn centers(&self) -> Vec<Point> {
        self.rects.iter().map(Rectangle::center).collect()
    }

    /// Recomputes `centers` in place, reusing its allocation
    pub fn centers_into(&self, centers: &mut Vec<Point>) {
        centers.clear();
        centers.extend(self.rects.iter().map(Rectangle::center));
    }

    /// Union of all bounding boxes, `None` when the set is empty
    pub fn bounds(&self) -> Option<Bounds> {
        if self.rects.is_empty() {
            return None;
        }
        let mut bounds = Bounds::empty();
        for rect in &self.rects {
            bounds.extend(&rect.bounds());
        }
        Some(bounds)
    }

    /// Mean rectangle width, zero for an empty set
    pub fn mean_width(&self) -> f64 {
        if self.rects.is_empty() {
            return 0.0;
        }
        self.rects.iter().map(|r| r.width).sum::<f64>() / self.rects.len() as f64
    }

    /// Number of unordered pairs whose interiors overlap
    ///
    /// Brute force; meant for diagnostics and tests rather than the hot loop.
    pub fn overlap_count(&self) -> usize {
        let mut count = 0;
        for (i, a) in self.rects.iter().enumerate() {
            count += self.rects[i + 1..].iter().filter(|b| a.overlaps(b)).count();
        }
        count
    }

    /// Rejects negative sizes and non-finite geometry
    ///
    /// # Errors
    /// Returns [`Error::NonFiniteGeometry`] or [`Error::NegativeSize`] for the first
    /// offending rectangle.
    pub fn validate(&self) -> Result<()> {
        for (index, r) in self.rects.iter().enumerate() {
            if !(r.x.is_finite() && r.y.is_finite() && r.width.is_finite() && r.height.is_finite()) {
                return Err(Error::NonFiniteGeometry { index });
            }
            if r.width < 0.0 || r.height < 0.0 {
                return Err(Error::NegativeSize { index, width: r.width, height: r.height });
            }
        }
        Ok(())
    }
}

impl From<Vec<Rectangle>> for RectangleSet {
    fn from(rects: Vec<Rectangle>) -> Self {
        Self { rects }
    }
}

impl From<&[Rectangle]> for RectangleSet {
    fn from(rects: &[Rectangle]) -> Self {
        Self { rects: rects.to_vec() }
    }
}

impl FromIterator<Rectangle> for RectangleSet {
    fn from_iter<T: IntoIterator<Item = Rectangle>>(iter: T) -> Self {
        Self { rects: iter.into_iter().collect() }
    }
}

impl std::ops::Index<usize> for RectangleSet {
    type Output = Rectangle;

    fn index(&self, index: usize) -> &Rectangle {
        &self.rects[index]
    }
}

impl std::ops::IndexMut<usize> for RectangleSet {
    fn index_mut(&mut self, index: usize) -> &mut Rectangle {
        &mut self.rects[index]
    }
}

impl<'a> IntoIterator for &'a RectangleSet {
    type Item = &'a Rectangle;
    type IntoIter = std::slice::Iter<'a, Rectangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.rects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_bounds() {
        let r = Rectangle::new(1.0, 2.0, 4.0, 2.0);
        assert_eq!(r.center(), Point::new(3.0, 3.0));
        assert_eq!(r.bounds(), Bounds::new(1.0, 2.0, 5.0, 4.0));
        assert_eq!(r.size(), 4.0);
    }

    #[test]
    fn test_set_bounds_is_union() {
        let set: RectangleSet = vec![
            Rectangle::new(0.0, 5.0, 1.0, 1.0),
            Rectangle::new(-3.0, 0.0, 10.0, 0.5),
        ]
        .into();
        assert_eq!(set.bounds(), Some(Bounds::new(-3.0, 0.0, 7.0, 6.0)));
        assert_eq!(RectangleSet::new().bounds(), None);
    }

    #[test]
    fn test_touching_edges_intersect_but_do_not_overlap() {
        let a = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let b = Rectangle::new(1.0, 0.0, 1.0, 1.0);
        assert!(a.bounds().intersects(&b.bounds()));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_validate_rejects_negative_and_nan() {
        let set: RectangleSet = vec![Rectangle::new(0.0, 0.0, 1.0, -1.0)].into();
        assert!(matches!(set.validate(), Err(Error::NegativeSize { index: 0, .. })));

        let set: RectangleSet =
            vec![Rectangle::new(0.0, 0.0, 1.0, 1.0), Rectangle::new(f64::NAN, 0.0, 1.0, 1.0)].into();
        assert_eq!(set.validate(), Err(Error::NonFiniteGeometry { index: 1 }));
    }

    #[test]
    fn test_mean_width_and_overlap_count() {
        let set: RectangleSet = vec![
            Rectangle::new(0.0, 0.0, 2.0, 1.0),
            Rectangle::new(1.0, 0.0, 4.0, 1.0),
            Rectangle::new(10.0, 0.0, 0.0, 1.0),
        ]
        .into();
        assert_eq!(set.mean_width(), 2.0);
        assert_eq!(set.overlap_count(), 1);
        assert_eq!(RectangleSet::new().mean_width(), 0.0);
    }

    #[test]
    fn test_serde_shape() {
        let set: RectangleSet = vec![Rectangle::new(1.0, 2.0, 3.0, 4.0)].into();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"[{"x":1.0,"y":2.0,"width":3.0,"height":4.0}]"#);
        let back: RectangleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
