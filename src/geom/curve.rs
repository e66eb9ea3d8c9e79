//! Bezier evaluation used to sample road segments between anchors.
//!
//! Parameters are not arc-length parameterized: equal steps in `t` give
//! samples that bunch up where the control polygon is short.

use super::core::Point3;

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;
}

/// Quadratic Bezier position: two lerps on the control legs, then a lerp of those.
#[must_use]
pub fn quadratic(a: Point3, b: Point3, c: Point3, t: f64) -> Point3 {
    let ab = a.lerp(b, t);
    let bc = b.lerp(c, t);
    ab.lerp(bc, t)
}

/// Cubic Bezier position built from two quadratic evaluations (De Casteljau).
#[must_use]
pub fn cubic(a: Point3, b: Point3, c: Point3, d: Point3, t: f64) -> Point3 {
    let abc = quadratic(a, b, c, t);
    let bcd = quadratic(b, c, d, t);
    abc.lerp(bcd, t)
}

/// Cheap length estimate for a cubic segment.
///
/// Only used to pick a sample count, so it needs to grow with the true length
/// rather than match it.
#[must_use]
pub fn approximate_cubic_length(a: Point3, b: Point3, c: Point3, d: Point3) -> f64 {
    let chord = d.distance_squared_to(a);
    let legs = a.distance_squared_to(c) + b.distance_squared_to(c) + d.distance_squared_to(b);
    ((legs + chord) / 2.0).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier3 {
    pub p0: Point3,
    pub p1: Point3,
    pub p2: Point3,
    pub p3: Point3,
}

impl CubicBezier3 {
    #[must_use]
    pub const fn new(p0: Point3, p1: Point3, p2: Point3, p3: Point3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    #[must_use]
    pub fn approximate_length(&self) -> f64 {
        approximate_cubic_length(self.p0, self.p1, self.p2, self.p3)
    }

    /// Number of fragments the segment is split into at `quality` samples per unit.
    #[must_use]
    pub fn fragment_count(&self, quality: f64) -> usize {
        let fragments = (self.approximate_length() * quality).round_ties_even();
        if fragments.is_finite() && fragments > 0.0 {
            fragments as usize
        } else {
            0
        }
    }

    /// Interior samples at `t = k / fragments` for `k = 1..fragments`.
    ///
    /// Both end points are excluded; the next anchor supplies the segment end.
    #[must_use]
    pub fn interior_samples(&self, quality: f64) -> Vec<Point3> {
        let fragments = self.fragment_count(quality);
        (1..fragments)
            .map(|k| self.point_at(k as f64 / fragments as f64))
            .collect()
    }
}

impl Curve3 for CubicBezier3 {
    fn point_at(&self, t: f64) -> Point3 {
        cubic(self.p0, self.p1, self.p2, self.p3, t)
    }
}
