//! Minimum-distance queries between points and line segments, and the
//! geometric median of a point set.

use crate::error::GeometryError;
use crate::point::{average, Point};

const SMALL_VALUE: f64 = 1e-6;

/// The minimum distance between two points.
pub fn distance_point_point(p1: Point, p2: Point) -> f64 {
    (p1 - p2).norm()
}

/// The minimum distance between point `p1` and the segment `(s2h, s2t)`.
///
/// Specialisation of [`distance_segment_segment`] with a degenerate first
/// segment (`u = 0`).
pub fn distance_point_segment(p1: Point, s2h: Point, s2t: Point) -> f64 {
    let v = s2t - s2h;
    let w = p1 - s2h;

    let c = v.dot(v);
    let e = v.dot(w);
    let mut tn = e;
    let td = c;

    if tn < 0.0 {
        tn = 0.0;
    } else if tn > td {
        tn = td;
    }

    let tc = if tn.abs() < SMALL_VALUE { 0.0 } else { tn / td };

    let d = w - tc * v;
    d.norm()
}

/// The minimum distance between segment `(s1h, s1t)` and segment `(s2h, s2t)`.
///
/// Classical parametric closest-point-between-segments method: solve the
/// 2x2 system for the unconstrained closest-point parameters `(sc, tc)`,
/// clamping each to `[0, 1]` in turn — `sc` first, then `tc` against the
/// re-derived value — and treating near-parallel segments (`|D| <
/// SMALL_VALUE`) and near-zero numerators as degenerate cases.
pub fn distance_segment_segment(s1h: Point, s1t: Point, s2h: Point, s2t: Point) -> f64 {
    let u = s1t - s1h;
    let v = s2t - s2h;
    let w = s1h - s2h;

    let a = u.dot(u);
    let b = u.dot(v);
    let c = v.dot(v);
    let d = u.dot(w);
    let e = v.dot(w);
    let big_d = a * c - b * b;

    let mut sn;
    let mut sd = big_d;
    let mut tn;
    let mut td = big_d;

    if big_d < SMALL_VALUE {
        sn = 0.0;
        sd = 1.0;
        tn = e;
        td = c;
    } else {
        sn = b * e - c * d;
        tn = a * e - b * d;
        if sn < 0.0 {
            sn = 0.0;
            tn = e;
            td = c;
        } else if sn > sd {
            sn = sd;
            tn = e + b;
            td = c;
        }
    }

    if tn < 0.0 {
        tn = 0.0;
        if -d < 0.0 {
            sn = 0.0;
        } else if -d > a {
            sn = sd;
        } else {
            sn = -d;
            sd = a;
        }
    } else if tn > td {
        tn = td;
        if (-d + b) < 0.0 {
            sn = 0.0;
        } else if (-d + b) > a {
            sn = sd;
        } else {
            sn = -d + b;
            sd = a;
        }
    }

    let sc = if sn.abs() < SMALL_VALUE { 0.0 } else { sn / sd };
    let tc = if tn.abs() < SMALL_VALUE { 0.0 } else { tn / td };

    let dp = w + sc * u - tc * v;
    dp.norm()
}

/// The geometric median of `pts` via Weiszfeld iteration, starting from the
/// arithmetic mean.
///
/// Convergence is checked from iteration 4 onward by comparing the sum of
/// squared residuals two steps apart; iteration halts when the relative
/// change drops below 5%. Hits the 200-iteration cap as an error.
pub fn geometric_median(pts: &[Point]) -> Result<Point, GeometryError> {
    const NUM_ITERATIONS: usize = 200;
    const CONVERGENCE_THRESHOLD: f64 = 0.05;

    if pts.is_empty() {
        return Err(GeometryError::EmptyInput);
    }
    if pts.len() == 1 {
        return Ok(pts[0]);
    }

    let mut r = average(pts)?;
    let mut dist_sum = Vec::with_capacity(NUM_ITERATIONS);

    let mut i = 0;
    let mut converged = false;
    while !converged && i < NUM_ITERATIONS {
        let mut denom = 0.0;
        let mut d = 0.0;
        let mut num = Point::zero();

        for p in pts {
            let div = distance_point_point(*p, r);
            num += *p / div;
            denom += 1.0 / div;
            d += div * div;
        }
        dist_sum.push(d);

        r = num / denom;

        if i > 3 {
            converged = (dist_sum[i] - dist_sum[i - 2]).abs() / dist_sum[i] < CONVERGENCE_THRESHOLD;
        }

        i += 1;
    }

    if i >= NUM_ITERATIONS {
        return Err(GeometryError::MedianDidNotConverge(NUM_ITERATIONS));
    }

    Ok(r)
}
