//! Pairwise repulsion rule.
//!
//! Given two rectangles, decide whether they collide and how far to push the
//! second one. Two independent tests run on every call:
//!
//! 1. **Sphere test** (only with `adjust_by_size`): each rectangle is treated as a
//!    disc of diameter `max(width, height)`. If the centres are closer than
//!    `radius_scale * (size1 + size2)` the second rectangle is pushed straight away
//!    from the first by `0.1 * size1 / dist * speed`.
//! 2. **Penetration test**: if the boxes overlap on both axes, the second rectangle
//!    is nudged vertically and horizontally, each by a jittered step, towards the
//!    side where it penetrates least.
//!
//! Both tests may fire on the same call, and their displacements add up. The
//! horizontal step of the penetration test is scaled by the first rectangle's
//! *height*, the same as the vertical step.

use rand::Rng;

use crate::rectangle::{Point, Rectangle};

/// Parameters of the repulsion rule
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepulsionParams {
    /// Global step multiplier
    pub speed: f64,
    /// Enables the sphere test
    pub adjust_by_size: bool,
    /// Scales the collision sphere
    pub radius_scale: f64,
}

/// Outcome of one rule application: the displacement of each test that fired
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Repulsion {
    /// `(dx, dy)` from the sphere test
    pub sphere: Option<(f64, f64)>,
    /// `(dx, dy)` from the penetration test
    pub overlap: Option<(f64, f64)>,
}

impl Repulsion {
    /// Whether either test fired
    pub fn is_collision(&self) -> bool {
        self.sphere.is_some() || self.overlap.is_some()
    }

    /// Moves `rect` by the sphere displacement, then by the penetration displacement
    pub fn apply(&self, rect: &mut Rectangle) {
        if let Some((dx, dy)) = self.sphere {
            rect.translate(dx, dy);
        }
        if let Some((dx, dy)) = self.overlap {
            rect.translate(dx, dy);
        }
    }
}

/// Evaluates both tests for the pair and returns the displacement of `second`
///
/// `first_center` and `second_center` feed the sphere test and may be stale with
/// respect to the rectangles (the simulator computes centres once per round); the
/// penetration test always uses the rectangles' own geometry.
pub fn repulse<R: Rng + ?Sized>(
    first: &Rectangle,
    first_center: Point,
    second: &Rectangle,
    second_center: Point,
    params: &RepulsionParams,
    rng: &mut R,
) -> Repulsion {
    let speed = params.speed;
    let mut outcome = Repulsion::default();

    if params.adjust_by_size {
        let x_dist = second_center.x - first_center.x;
        let y_dist = second_center.y - first_center.y;
        let dist = (x_dist * x_dist + y_dist * y_dist).sqrt();
        let size1 = first.size();
        let size2 = second.size();

        if dist < params.radius_scale * (size1 + size2) {
            let displacement = if dist > 0.0 {
                let f = 0.1 * size1 / dist;
                (x_dist / dist * f * speed, y_dist / dist * f * speed)
            } else {
                // Coincident centres have no direction; scatter them instead.
                let dx = (0.5 - rng.random::<f64>()) * 0.01 * speed;
                let dy = (0.5 - rng.random::<f64>()) * 0.01 * speed;
                (dx, dy)
            };
            outcome.sphere = Some(displacement);
        }
    }

    let up = first.y + first.height - second.y;
    let down = second.y + second.height - first.y;
    let left = second.x + second.width - first.x;
    let right = first.x + first.width - second.x;

    if up > 0.0 && down > 0.0 && left > 0.0 && right > 0.0 {
        let step_y = 0.02 * first.height * jitter(rng) * speed;
        let dy = if up > down { -step_y } else { step_y };
        let step_x = 0.01 * (first.height * 2.0) * jitter(rng) * speed;
        let dx = if left > right { step_x } else { -step_x };
        outcome.overlap = Some((dx, dy));
    }

    outcome
}

/// Applies [`repulse`] to `rects[second]` in place
///
/// Both rectangles are read before anything moves.
///
/// # Panics
/// Panics if either index is out of range for `rects` or `centers`.
pub fn repulse_pair<R: Rng + ?Sized>(
    rects: &mut [Rectangle],
    centers: &[Point],
    first: usize,
    second: usize,
    params: &RepulsionParams,
    rng: &mut R,
) -> Repulsion {
    let outcome = repulse(
        &rects[first],
        centers[first],
        &rects[second],
        centers[second],
        params,
        rng,
    );
    outcome.apply(&mut rects[second]);
    outcome
}

/// Uniform multiplier in `[0.8, 1.2)`
#[inline]
fn jitter<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    0.8 + 0.4 * rng.random::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn params(adjust_by_size: bool) -> RepulsionParams {
        RepulsionParams { speed: 0.5, adjust_by_size, radius_scale: 1.1 }
    }

    fn run(a: Rectangle, b: Rectangle, p: &RepulsionParams) -> Repulsion {
        let mut rng = StdRng::seed_from_u64(7);
        repulse(&a, a.center(), &b, b.center(), p, &mut rng)
    }

    #[test]
    fn test_far_apart_no_collision() {
        let a = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let b = Rectangle::new(5.0, 5.0, 1.0, 1.0);
        let outcome = run(a, b, &params(true));
        assert!(!outcome.is_collision());
    }

    #[test]
    fn test_sphere_pushes_away_from_first() {
        let a = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let b = Rectangle::new(1.5, 0.0, 1.0, 1.0);
        let outcome = run(a, b, &params(true));
        assert!(outcome.overlap.is_none(), "boxes are disjoint");
        let (dx, dy) = outcome.sphere.expect("centres 1.5 apart are inside 2.2");
        // 0.1 * size1 / dist * speed along +x
        assert!((dx - 0.1 / 1.5 * 0.5).abs() < 1e-12);
        assert_eq!(dy, 0.0);
    }

    #[test]
    fn test_sphere_disabled_without_adjust_by_size() {
        let a = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let b = Rectangle::new(1.5, 0.0, 1.0, 1.0);
        assert!(!run(a, b, &params(false)).is_collision());
    }

    #[test]
    fn test_coincident_centres_use_bounded_jitter() {
        let a = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let p = params(true);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let outcome = repulse(&a, a.center(), &a, a.center(), &p, &mut rng);
            let (dx, dy) = outcome.sphere.expect("coincident rectangles always collide");
            assert!(dx.abs() <= 0.005 * p.speed && dy.abs() <= 0.005 * p.speed);
            assert!(dx.is_finite() && dy.is_finite());
        }
    }

    #[test]
    fn test_penetration_direction_and_magnitude() {
        // Second sits on the upper part of the first and sticks out to the right
        let a = Rectangle::new(0.0, 0.0, 2.0, 2.0);
        let b = Rectangle::new(0.5, 1.5, 2.0, 2.0);
        let p = params(false);
        let (dx, dy) = run(a, b, &p).overlap.expect("boxes overlap");
        // up = 0.5 < down = 3.5: pushed upwards
        assert!(dy > 0.0);
        assert!(dy >= 0.02 * 2.0 * 0.8 * p.speed && dy <= 0.02 * 2.0 * 1.2 * p.speed);
        // left = 2.5 > right = 1.5: pushed right, scaled by the first height
        assert!(dx > 0.0);
        assert!(dx >= 0.04 * 0.8 * p.speed && dx <= 0.04 * 1.2 * p.speed);
    }

    #[test]
    fn test_touching_edges_do_not_penetrate() {
        let a = Rectangle::new(0.0, 0.0, 1.0, 1.0);
        let b = Rectangle::new(1.0, 0.0, 1.0, 1.0);
        assert!(run(a, b, &params(false)).overlap.is_none());
    }

    #[test]
    fn test_both_tests_compound() {
        let a = Rectangle::new(0.0, 0.0, 2.0, 1.0);
        let b = Rectangle::new(0.5, 0.0, 2.0, 1.0);
        let outcome = run(a, b, &params(true));
        let (sx, _) = outcome.sphere.expect("sphere fires");
        let (ox, _) = outcome.overlap.expect("penetration fires");

        let mut moved = b;
        outcome.apply(&mut moved);
        assert!((moved.x - (b.x + sx + ox)).abs() < 1e-12);
        assert_eq!(moved.width, b.width);
    }

    #[test]
    fn test_repulse_pair_moves_only_second() {
        let mut rects = vec![Rectangle::new(0.0, 0.0, 2.0, 1.0), Rectangle::new(0.0, 0.0, 2.0, 1.0)];
        let centers: Vec<Point> = rects.iter().map(Rectangle::center).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = repulse_pair(&mut rects, &centers, 0, 1, &params(false), &mut rng);
        assert!(outcome.is_collision());
        assert_eq!(rects[0], Rectangle::new(0.0, 0.0, 2.0, 1.0));
        assert_ne!(rects[1], rects[0]);
    }
}
