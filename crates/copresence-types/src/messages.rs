//! The three messages the runtime subscribes to, and the one it publishes.
//!
//! These are the typed payloads a concrete broker implementation decodes
//! from the wire; the wire codec itself is out of scope here (see
//! `copresence-middleware`).

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use copresence_geometry::Point;
use copresence_mode::Mode;

use crate::body::{BodySegment, Interval, Timestamp};

/// Announces a body's static shape: its segments and, for a robot, its
/// reporting frequency.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BodyPresentationMessage {
    pub id: String,
    pub is_human: bool,
    #[schemars(with = "Vec<(String, String)>")]
    pub segment_pairs: Vec<(String, String)>,
    pub thicknesses: Vec<f64>,
    pub frequency: Option<u32>,
}

impl BodyPresentationMessage {
    /// The [`BodySegment`]s this presentation describes.
    ///
    /// # Panics
    ///
    /// Panics if `segment_pairs` and `thicknesses` differ in length; a
    /// well-formed presentation message never does.
    pub fn segments(&self) -> Vec<BodySegment> {
        assert_eq!(self.segment_pairs.len(), self.thicknesses.len());
        self.segment_pairs.iter().zip(&self.thicknesses).map(|((a, b), t)| BodySegment::new(a.clone(), b.clone(), *t)).collect()
    }
}

/// One frame of human keypoint observations, possibly for several bodies at
/// once. `bodies[id][keypoint]` is the list of points reported for that
/// keypoint this frame (more than one when it was detected multiple times).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanStateMessage {
    pub bodies: HashMap<String, HashMap<String, Vec<Point>>>,
    pub timestamp: Timestamp,
}

/// The head/tail point observations reported for one robot segment in one
/// frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentPointSample {
    pub heads: Vec<Point>,
    pub tails: Vec<Point>,
}

/// One frame of robot state: the mode it is currently in, plus the per-segment
/// point observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotStateMessage {
    pub id: String,
    pub mode: Mode,
    pub points_per_segment: Vec<SegmentPointSample>,
    pub timestamp: Timestamp,
}

/// A predicted future collision between a human segment and a robot
/// segment, published once the runtime's look-ahead finds one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionNotificationMessage {
    pub human_id: String,
    pub human_segment: usize,
    pub robot_id: String,
    pub robot_segment: usize,
    pub current_time: Timestamp,
    pub distance_interval: Interval<f64>,
    pub collision_mode: Mode,
    pub likelihood: f64,
}
