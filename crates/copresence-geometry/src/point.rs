//! Point primitive and the vector arithmetic built on top of it.
//!
//! A [`Point`] is an absolute 3-D coordinate; it also doubles as a
//! displacement vector wherever the geometric kernel needs one (the segment
//! distance algorithm subtracts points to get edge vectors, for instance).

use std::ops::{Add, AddAssign, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point (or vector) in 3-D space.
///
/// A point is considered [`Point::is_undefined`] when all three coordinates
/// are `NaN`. Equality is exact (no epsilon tolerance) — callers that need
/// approximate comparison should do so explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// A point with every coordinate set to `NaN`.
    pub fn undefined() -> Self {
        Self::new(f64::NAN, f64::NAN, f64::NAN)
    }

    /// True when every coordinate is `NaN`.
    pub fn is_undefined(&self) -> bool {
        self.x.is_nan() && self.y.is_nan() && self.z.is_nan()
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Euclidean norm.
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, s: f64) -> Point {
        Point::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Point> for f64 {
    type Output = Point;
    fn mul(self, p: Point) -> Point {
        p * self
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, c: f64) -> Point {
        Point::new(self.x / c, self.y / c, self.z / c)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// The midpoint of the segment joining `p1` and `p2`.
pub fn centre(p1: Point, p2: Point) -> Point {
    (p1 + p2) / 2.0
}

/// The arithmetic mean of `pts`.
///
/// # Errors
///
/// Returns [`crate::GeometryError::EmptyInput`] when `pts` is empty.
pub fn average(pts: &[Point]) -> Result<Point, crate::GeometryError> {
    if pts.is_empty() {
        return Err(crate::GeometryError::EmptyInput);
    }
    let sum = pts.iter().fold(Point::zero(), |acc, p| acc + *p);
    Ok(sum / pts.len() as f64)
}
