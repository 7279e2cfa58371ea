//! [`HumanStateInstance`] and [`HumanStateHistory`]: a strictly
//! time-ordered log of human keypoint observations.

use std::collections::HashMap;

use copresence_geometry::{BodySegmentSample, Point};
use copresence_types::{Body, BodyIdentity, Timestamp};

use crate::error::HistoryError;

/// One frame of human observation: a [`BodySegmentSample`] per segment,
/// built from that frame's reported keypoints.
#[derive(Debug, Clone)]
pub struct HumanStateInstance {
    samples: Vec<Vec<BodySegmentSample>>,
    timestamp: Timestamp,
}

impl HumanStateInstance {
    /// Build an instance from a human body's segment definitions and the
    /// points reported per keypoint this frame.
    ///
    /// A keypoint absent from `points_by_keypoint` contributes no
    /// observation and its segment's sample degenerates to the origin;
    /// well-formed callers always report every keypoint the body defines.
    pub fn new(body: &Body, points_by_keypoint: &HashMap<String, Vec<Point>>, timestamp: Timestamp) -> Result<Self, HistoryError> {
        let empty: Vec<Point> = Vec::new();
        let mut samples = Vec::with_capacity(body.segments().len());
        for segment in body.segments() {
            let (a, b) = segment.keypoints();
            let heads = points_by_keypoint.get(a).unwrap_or(&empty);
            let tails = points_by_keypoint.get(b).unwrap_or(&empty);
            let sample = BodySegmentSample::new(heads, tails, segment.thickness).map_err(|_| HistoryError::NoMatch)?;
            samples.push(vec![sample]);
        }
        Ok(Self { samples, timestamp })
    }

    pub fn samples(&self) -> &[Vec<BodySegmentSample>] {
        &self.samples
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Time-ordered log of [`HumanStateInstance`]s for one human body.
pub struct HumanStateHistory {
    body: Body,
    instances: Vec<HumanStateInstance>,
}

impl HumanStateHistory {
    pub fn new(body: Body) -> Self {
        Self { body, instances: Vec::new() }
    }

    pub fn size(&self) -> usize {
        self.instances.len()
    }

    /// Append a new instance. `ts` must exceed the current latest timestamp.
    pub fn acquire(&mut self, points_by_keypoint: &HashMap<String, Vec<Point>>, ts: Timestamp) -> Result<(), HistoryError> {
        if let Some(latest) = self.instances.last() {
            if ts <= latest.timestamp() {
                return Err(HistoryError::OutOfOrderTimestamp(ts));
            }
        }
        let instance = HumanStateInstance::new(&self.body, points_by_keypoint, ts)?;
        self.instances.push(instance);
        Ok(())
    }

    pub fn earliest_time(&self) -> Result<Timestamp, HistoryError> {
        self.instances.first().map(|i| i.timestamp()).ok_or(HistoryError::NoMatch)
    }

    pub fn latest_time(&self) -> Result<Timestamp, HistoryError> {
        self.instances.last().map(|i| i.timestamp()).ok_or(HistoryError::NoMatch)
    }

    pub fn instance_at_number(&self, number: usize) -> Result<&HumanStateInstance, HistoryError> {
        self.instances.get(number).ok_or(HistoryError::NoMatch)
    }

    /// The index of the instance recorded at exactly `ts`.
    pub fn instance_number(&self, ts: Timestamp) -> Result<usize, HistoryError> {
        self.instances.iter().position(|i| i.timestamp() == ts).ok_or(HistoryError::NoMatch)
    }

    /// The absolute difference between the indices of the instances at `t1`
    /// and `t2`.
    pub fn instance_distance(&self, t1: Timestamp, t2: Timestamp) -> Result<usize, HistoryError> {
        let n1 = self.instance_number(t1)?;
        let n2 = self.instance_number(t2)?;
        Ok(n1.abs_diff(n2))
    }

    /// The newest instance with timestamp `<= ts`.
    pub fn latest_within(&self, ts: Timestamp) -> Result<&HumanStateInstance, HistoryError> {
        self.instances.iter().rev().find(|i| i.timestamp() <= ts).ok_or(HistoryError::NoMatch)
    }

    /// Drop every instance older than `ts`, keeping those with `timestamp >= ts`.
    pub fn remove_older_than(&mut self, ts: Timestamp) {
        self.instances.retain(|i| i.timestamp() >= ts);
    }
}
