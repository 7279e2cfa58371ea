//! Axis-aligned [`Box`] and [`Sphere`] bounding volumes.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// An axis-aligned box, described by three closed intervals.
///
/// `is_empty` holds exactly when some lower bound exceeds its corresponding
/// upper bound; [`Bounds::empty`] constructs the canonical empty box
/// (lower bounds at `+inf`, upper bounds at `-inf`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub xl: f64,
    pub xu: f64,
    pub yl: f64,
    pub yu: f64,
    pub zl: f64,
    pub zu: f64,
}

impl Bounds {
    /// Create a box from its six scalar bounds. No normalisation is
    /// performed — passing `xl > xu` produces an (intentionally) empty box.
    pub fn new(xl: f64, xu: f64, yl: f64, yu: f64, zl: f64, zu: f64) -> Self {
        Self { xl, xu, yl, yu, zl, zu }
    }

    /// The distinguished empty box.
    pub fn empty() -> Self {
        Self::new(f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY)
    }

    /// True when any lower bound exceeds its upper bound.
    pub fn is_empty(&self) -> bool {
        self.xl > self.xu || self.yl > self.yu || self.zl > self.zu
    }

    /// The centre point. Meaningless (but not undefined) for an empty box.
    pub fn centre(&self) -> Point {
        Point::new((self.xl + self.xu) / 2.0, (self.yl + self.yu) / 2.0, (self.zl + self.zu) / 2.0)
    }

    /// The radius of the sphere whose diameter is the box's space diagonal.
    pub fn circle_radius(&self) -> f64 {
        let dx = self.xu - self.xl;
        let dy = self.yu - self.yl;
        let dz = self.zu - self.zl;
        (dx * dx + dy * dy + dz * dz).sqrt() / 2.0
    }

    /// True when the two boxes share no point: strict separation along at
    /// least one axis.
    pub fn disjoint(&self, other: &Bounds) -> bool {
        self.xu < other.xl || self.xl > other.xu
            || self.yu < other.yl || self.yl > other.yu
            || self.zu < other.zl || self.zl > other.zu
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{[{}:{}],[{}:{}],[{}:{}]}}", self.xl, self.xu, self.yl, self.yu, self.zl, self.zu)
    }
}

/// The minimum bounding box enclosing `p1` and `p2`.
pub fn hull(p1: Point, p2: Point) -> Bounds {
    Bounds::new(
        p1.x.min(p2.x), p1.x.max(p2.x),
        p1.y.min(p2.y), p1.y.max(p2.y),
        p1.z.min(p2.z), p1.z.max(p2.z),
    )
}

/// The minimum box enclosing the union of two boxes.
pub fn hull_boxes(a: &Bounds, b: &Bounds) -> Bounds {
    Bounds::new(
        a.xl.min(b.xl), a.xu.max(b.xu),
        a.yl.min(b.yl), a.yu.max(b.yu),
        a.zl.min(b.zl), a.zu.max(b.zu),
    )
}

/// Inflate every interval of `bb` by `v` on each side.
pub fn widen(bb: Bounds, v: f64) -> Bounds {
    Bounds::new(bb.xl - v, bb.xu + v, bb.yl - v, bb.yu + v, bb.zl - v, bb.zu + v)
}

/// A sphere described by its centre and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub centre: Point,
    pub radius: f64,
}

impl Sphere {
    /// Create a sphere. `radius` must be `>= 0`; this is not enforced here,
    /// callers that assemble a sphere from geometric quantities guarantee it.
    pub fn new(centre: Point, radius: f64) -> Self {
        Self { centre, radius }
    }

    /// True when `other` shares at least one point with `self`.
    pub fn intersects(&self, other: &Sphere) -> bool {
        let d = (self.centre - other.centre).norm();
        d <= self.radius + other.radius
    }
}

impl std::fmt::Display for Sphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(centre: {}, radius: {})", self.centre, self.radius)
    }
}
