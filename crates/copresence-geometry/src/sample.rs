//! [`BodySegmentSample`] — a thick line segment with propagated uncertainty.
//!
//! A sample is the dynamic instance of a [`crate::segment`] keypoint pair:
//! a head/tail point pair, each carrying a bounding box describing the
//! measurement uncertainty at that point, plus the derived error, bounding
//! box and bounding sphere used by the intersection and distance tests.

use crate::bounds::{hull, hull_boxes, widen, Bounds, Sphere};
use crate::distance::distance_segment_segment;
use crate::error::GeometryError;
use crate::point::{average, centre, Point};

/// A thick segment sample: head and tail points plus their uncertainty
/// envelopes, and the quantities derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySegmentSample {
    head: Point,
    tail: Point,
    head_bound: Bounds,
    tail_bound: Bounds,
    thickness: f64,
    error: f64,
    bounding_box: Bounds,
    bounding_sphere: Sphere,
}

impl BodySegmentSample {
    /// Build a sample from one or more observed head/tail points.
    ///
    /// `heads`/`tails` may each contain more than one point when a keypoint
    /// was reported multiple times within the same frame; the sample's head
    /// and tail are the arithmetic means, and the bound boxes are the hulls
    /// of all reported points. A single observation yields a zero-volume
    /// hull and therefore zero [`BodySegmentSample::error`].
    pub fn new(heads: &[Point], tails: &[Point], thickness: f64) -> Result<Self, GeometryError> {
        let mut sample = Self {
            head: Point::zero(),
            tail: Point::zero(),
            head_bound: Bounds::empty(),
            tail_bound: Bounds::empty(),
            thickness,
            error: 0.0,
            bounding_box: Bounds::empty(),
            bounding_sphere: Sphere::new(Point::zero(), 0.0),
        };
        sample.update(heads, tails)?;
        Ok(sample)
    }

    /// Recompute head/tail and every derived quantity from a fresh batch of
    /// observations.
    pub fn update(&mut self, heads: &[Point], tails: &[Point]) -> Result<(), GeometryError> {
        self.head = average(heads)?;
        self.tail = average(tails)?;
        self.head_bound = hull_of_many(heads);
        self.tail_bound = hull_of_many(tails);
        self.error = self.head_bound.circle_radius() + self.tail_bound.circle_radius();

        self.bounding_box = widen(hull_boxes(&self.head_bound, &self.tail_bound), self.thickness);
        let sphere_radius = (self.head - self.tail).norm() / 2.0 + self.thickness + self.error / 2.0;
        self.bounding_sphere = Sphere::new(centre(self.head, self.tail), sphere_radius);

        Ok(())
    }

    pub fn head(&self) -> Point {
        self.head
    }

    pub fn tail(&self) -> Point {
        self.tail
    }

    pub fn head_bound(&self) -> Bounds {
        self.head_bound
    }

    pub fn tail_bound(&self) -> Bounds {
        self.tail_bound
    }

    pub fn thickness(&self) -> f64 {
        self.thickness
    }

    /// Propagated distance uncertainty: the sum of the head and tail bound
    /// circle radii.
    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn bounding_box(&self) -> Bounds {
        self.bounding_box
    }

    pub fn bounding_sphere(&self) -> Sphere {
        self.bounding_sphere
    }

    /// True when `head == tail`, i.e. the segment has degenerated to a
    /// sphere.
    pub fn is_degenerate(&self) -> bool {
        self.head == self.tail
    }

    /// Conservative three-tier intersection test against `other`, cheapest
    /// check first: disjoint bounding spheres, then disjoint bounding
    /// boxes, then the exact thickened-segment distance.
    pub fn intersects(&self, other: &BodySegmentSample) -> bool {
        if !self.bounding_sphere.intersects(&other.bounding_sphere) {
            return false;
        }
        if self.bounding_box.disjoint(&other.bounding_box) {
            return false;
        }
        let d = distance_segment_segment(self.head, self.tail, other.head, other.tail);
        d <= self.thickness + other.thickness + self.error + other.error
    }

    /// The distance between the two segments' surfaces: the raw
    /// segment-to-segment distance minus both thicknesses and both error
    /// margins, floored at zero.
    pub fn distance_to(&self, other: &BodySegmentSample) -> f64 {
        let raw = distance_segment_segment(self.head, self.tail, other.head, other.tail);
        (raw - self.thickness - other.thickness - self.error - other.error).max(0.0)
    }
}

fn hull_of_many(pts: &[Point]) -> Bounds {
    pts.iter().skip(1).fold(hull(pts[0], pts[0]), |acc, p| hull_boxes(&acc, &hull(*p, *p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(head: Point, tail: Point, thickness: f64) -> BodySegmentSample {
        BodySegmentSample::new(&[head], &[tail], thickness).unwrap()
    }

    #[test]
    fn single_observation_has_zero_error() {
        let s = sample(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0), 0.1);
        assert_eq!(s.error(), 0.0);
    }

    #[test]
    fn repeated_observations_widen_error() {
        let s = BodySegmentSample::new(
            &[Point::new(0.0, 0.0, 0.0), Point::new(0.0, 0.1, 0.0)],
            &[Point::new(1.0, 0.0, 0.0)],
            0.1,
        ).unwrap();
        assert!(s.error() > 0.0);
    }

    #[test]
    fn degenerate_sample_when_head_equals_tail() {
        let p = Point::new(1.0, 1.0, 1.0);
        let s = sample(p, p, 0.1);
        assert!(s.is_degenerate());
    }

    #[test]
    fn far_apart_samples_do_not_intersect() {
        let a = sample(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0), 0.1);
        let b = sample(Point::new(100.0, 0.0, 0.0), Point::new(101.0, 0.0, 0.0), 0.1);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn overlapping_thick_samples_intersect() {
        let a = sample(Point::new(0.0, 0.0, 0.0), Point::new(2.0, 0.0, 0.0), 0.5);
        let b = sample(Point::new(1.0, 0.2, 0.0), Point::new(3.0, 0.2, 0.0), 0.5);
        assert!(a.intersects(&b));
    }

    #[test]
    fn distance_to_floors_at_zero_when_overlapping() {
        let a = sample(Point::new(0.0, 0.0, 0.0), Point::new(2.0, 0.0, 0.0), 0.5);
        let b = sample(Point::new(1.0, 0.2, 0.0), Point::new(3.0, 0.2, 0.0), 0.5);
        assert_eq!(a.distance_to(&b), 0.0);
    }

    #[test]
    fn distance_to_subtracts_thickness_and_error() {
        let a = sample(Point::new(0.0, 0.0, 0.0), Point::new(2.0, 0.0, 0.0), 0.1);
        let b = sample(Point::new(0.0, 5.0, 0.0), Point::new(2.0, 5.0, 0.0), 0.1);
        let d = a.distance_to(&b);
        assert!((d - (5.0 - 0.2)).abs() < 1e-6);
    }
}
