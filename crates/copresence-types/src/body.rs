//! [`Body`] definitions: the static shape of a human or robot, as an
//! ordered list of [`BodySegment`]s between named keypoints.

use serde::{Deserialize, Serialize};

/// Milliseconds since an arbitrary epoch. Plain integer, never a wall-clock
/// capture: the core only ever compares timestamps to each other.
pub type Timestamp = u64;

/// A closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Interval<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A static segment definition: an unordered pair of keypoint identifiers
/// plus the segment's physical thickness.
///
/// Equality and hashing treat `(a, b)` and `(b, a)` as the same segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodySegment {
    keypoint_a: String,
    keypoint_b: String,
    pub thickness: f64,
}

impl BodySegment {
    /// Create a segment. `thickness` must be `> 0`; this is not enforced
    /// here, callers that assemble segments from configuration guarantee it.
    pub fn new(keypoint_a: impl Into<String>, keypoint_b: impl Into<String>, thickness: f64) -> Self {
        Self { keypoint_a: keypoint_a.into(), keypoint_b: keypoint_b.into(), thickness }
    }

    pub fn keypoints(&self) -> (&str, &str) {
        (&self.keypoint_a, &self.keypoint_b)
    }
}

impl PartialEq for BodySegment {
    fn eq(&self, other: &Self) -> bool {
        let mine = (self.keypoint_a.as_str(), self.keypoint_b.as_str());
        let theirs = (other.keypoint_a.as_str(), other.keypoint_b.as_str());
        mine == theirs || mine == (theirs.1, theirs.0)
    }
}

/// A human or robot, as the registry sees it: an id and the ordered segment
/// list a sample stream reports against.
///
/// Human and robot bodies share segment structure but differ in what else
/// they carry — a robot additionally has a reporting frequency and its
/// state carries a [`copresence_mode::Mode`] (tracked by the history
/// engine, not here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Body {
    Human { id: String, segments: Vec<BodySegment> },
    Robot { id: String, message_frequency: u32, segments: Vec<BodySegment> },
}

/// Accessors shared by both [`Body`] variants.
pub trait BodyIdentity {
    fn id(&self) -> &str;
    fn segments(&self) -> &[BodySegment];
    fn is_human(&self) -> bool;
}

impl BodyIdentity for Body {
    fn id(&self) -> &str {
        match self {
            Body::Human { id, .. } => id,
            Body::Robot { id, .. } => id,
        }
    }

    fn segments(&self) -> &[BodySegment] {
        match self {
            Body::Human { segments, .. } => segments,
            Body::Robot { segments, .. } => segments,
        }
    }

    fn is_human(&self) -> bool {
        matches!(self, Body::Human { .. })
    }
}

/// The fixture used to auto-register a human id reported but never
/// presented: a single head/torso segment with a conservative thickness.
pub fn default_human_presentation(id: impl Into<String>) -> Body {
    Body::Human { id: id.into(), segments: vec![BodySegment::new("head", "torso", 0.25)] }
}
