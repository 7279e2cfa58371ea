//! [`Presence`] and [`RobotStateHistory`]: the robot's mode-segmented
//! observation log, and the [`RobotHistorySnapshot`] view it is queried
//! through.

use std::collections::HashMap;

use copresence_geometry::{BodySegmentSample, Point};
use copresence_mode::{Mode, ModeTrace};
use copresence_types::{Body, BodyIdentity, Interval, Timestamp};

use crate::error::HistoryError;

/// A maximal interval during which the robot stayed in one [`Mode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Presence {
    mode: Mode,
    from: Timestamp,
    to: Timestamp,
}

impl Presence {
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn from(&self) -> Timestamp {
        self.from
    }

    pub fn to(&self) -> Timestamp {
        self.to
    }
}

#[derive(Debug, Clone)]
struct PresenceEntry {
    timestamp: Timestamp,
    samples: Vec<Vec<BodySegmentSample>>,
}

#[derive(Debug, Clone)]
struct PresenceRecord {
    presence: Presence,
    entries: Vec<PresenceEntry>,
}

/// Append-only, mode-segmented observation log for one robot body.
pub struct RobotStateHistory {
    body: Body,
    records: Vec<PresenceRecord>,
}

impl RobotStateHistory {
    pub fn new(body: Body) -> Self {
        Self { body, records: Vec::new() }
    }

    fn build_entry_samples(&self, points_by_segment: &HashMap<String, Vec<Point>>) -> Result<Vec<Vec<BodySegmentSample>>, HistoryError> {
        let empty: Vec<Point> = Vec::new();
        let mut out = Vec::with_capacity(self.body.segments().len());
        for segment in self.body.segments() {
            let (a, b) = segment.keypoints();
            let heads = points_by_segment.get(a).unwrap_or(&empty);
            let tails = points_by_segment.get(b).unwrap_or(&empty);
            let sample = BodySegmentSample::new(heads, tails, segment.thickness).map_err(|_| HistoryError::NoMatch)?;
            out.push(vec![sample]);
        }
        Ok(out)
    }

    /// Record one frame of robot state.
    ///
    /// If `mode` differs from the current terminal presence's mode (or the
    /// history is empty), the terminal presence is closed at `ts` and a new
    /// one opened; otherwise the terminal presence is extended. `ts` must
    /// exceed the history's current latest timestamp.
    pub fn acquire(&mut self, mode: Mode, points_by_segment: &HashMap<String, Vec<Point>>, ts: Timestamp) -> Result<(), HistoryError> {
        if let Some(terminal) = self.records.last() {
            if ts <= terminal.presence.to {
                return Err(HistoryError::OutOfOrderTimestamp(ts));
            }
        }
        let samples = self.build_entry_samples(points_by_segment)?;

        if self.records.is_empty() {
            self.records.push(PresenceRecord { presence: Presence { mode: Mode::empty(), from: 0, to: ts }, entries: Vec::new() });
        }

        let same_mode = self.records.last().is_some_and(|r| r.presence.mode == mode);
        if same_mode {
            let terminal = self.records.last_mut().expect("just checked non-empty");
            terminal.presence.to = ts;
            terminal.entries.push(PresenceEntry { timestamp: ts, samples });
        } else {
            if let Some(terminal) = self.records.last_mut() {
                terminal.presence.to = ts;
            }
            self.records.push(PresenceRecord { presence: Presence { mode, from: ts, to: ts }, entries: vec![PresenceEntry { timestamp: ts, samples }] });
        }
        Ok(())
    }

    /// The timestamp of the most recent acquired frame.
    pub fn latest_time(&self) -> Result<Timestamp, HistoryError> {
        self.records.last().and_then(|r| r.entries.last()).map(|e| e.timestamp).ok_or(HistoryError::NoMatch)
    }

    /// A view restricted to presences with `from <= ts`, with the terminal
    /// presence's samples trimmed to timestamps `<= ts`.
    pub fn snapshot_at(&self, ts: Timestamp) -> RobotHistorySnapshot {
        let mut views = Vec::new();
        for record in &self.records {
            if record.presence.from > ts {
                break;
            }
            let entries: Vec<PresenceEntry> = record.entries.iter().filter(|e| e.timestamp <= ts).cloned().collect();
            let to = record.presence.to.min(ts);
            views.push(PresenceView { presence: Presence { mode: record.presence.mode.clone(), from: record.presence.from, to }, entries });
        }
        RobotHistorySnapshot { views, ts, num_segments: self.body.segments().len() }
    }
}

#[derive(Debug, Clone)]
struct PresenceView {
    presence: Presence,
    entries: Vec<PresenceEntry>,
}

impl PresenceView {
    fn sample_count(&self) -> usize {
        self.entries.len()
    }

    fn entries_up_to(&self, ts: Timestamp) -> usize {
        self.entries.iter().filter(|e| e.timestamp <= ts).count()
    }

    fn samples_by_segment(&self, num_segments: usize) -> Vec<Vec<BodySegmentSample>> {
        let mut out = vec![Vec::new(); num_segments];
        for entry in &self.entries {
            for (i, segment_samples) in entry.samples.iter().enumerate() {
                out[i].extend(segment_samples.iter().cloned());
            }
        }
        out
    }
}

/// A time-bounded, read-only view over a [`RobotStateHistory`].
pub struct RobotHistorySnapshot {
    views: Vec<PresenceView>,
    ts: Timestamp,
    num_segments: usize,
}

impl RobotHistorySnapshot {
    /// Completed presences (i.e. excluding the terminal one) whose mode
    /// equals `mode`.
    pub fn presences_in(&self, mode: &Mode) -> Vec<&Presence> {
        self.completed().filter(|p| p.presence.mode == *mode).map(|p| &p.presence).collect()
    }

    /// Presences whose immediate successor's mode equals `mode` (the seeded
    /// empty-mode presence is eligible as a predecessor).
    pub fn presences_exiting_into(&self, mode: &Mode) -> Vec<&Presence> {
        self.adjacent_pairs().filter(|(_, next)| next.presence.mode == *mode).map(|(cur, _)| &cur.presence).collect()
    }

    /// Presences of `mode_a` immediately followed by a presence of `mode_b`.
    pub fn presences_between(&self, mode_a: &Mode, mode_b: &Mode) -> Vec<&Presence> {
        self.adjacent_pairs()
            .filter(|(cur, next)| cur.presence.mode == *mode_a && next.presence.mode == *mode_b)
            .map(|(cur, _)| &cur.presence)
            .collect()
    }

    /// Distinct modes with at least one completed sample set.
    pub fn modes_with_samples(&self) -> Vec<Mode> {
        let mut modes: Vec<Mode> = Vec::new();
        for view in self.completed() {
            if view.sample_count() > 0 && !modes.contains(&view.presence.mode) {
                modes.push(view.presence.mode.clone());
            }
        }
        modes
    }

    /// Per-segment sample lists concatenated across all completed presences
    /// of `mode`, in chronological order.
    pub fn samples(&self, mode: &Mode) -> Result<Vec<Vec<BodySegmentSample>>, HistoryError> {
        let mut out = vec![Vec::new(); self.num_segments];
        let mut found = false;
        for view in self.completed().filter(|v| v.presence.mode == *mode) {
            found = true;
            for (i, segment_samples) in view.samples_by_segment(self.num_segments).into_iter().enumerate() {
                out[i].extend(segment_samples);
            }
        }
        if found { Ok(out) } else { Err(HistoryError::NoMatch) }
    }

    /// The range of per-presence sample counts for completed presences of
    /// `mode`; `[0,0]` if `mode` has no completed presence.
    pub fn range_of_num_samples_in(&self, mode: &Mode) -> Interval<usize> {
        let counts: Vec<usize> = self.completed().filter(|v| v.presence.mode == *mode).map(|v| v.sample_count()).collect();
        interval_of(&counts)
    }

    /// The range of sample counts for completed presences of `mode_a`
    /// immediately followed by a presence of `mode_b`.
    pub fn range_of_num_samples_in_pair(&self, mode_a: &Mode, mode_b: &Mode) -> Interval<usize> {
        let counts: Vec<usize> = self
            .adjacent_pairs()
            .filter(|(cur, next)| cur.presence.mode == *mode_a && next.presence.mode == *mode_b)
            .map(|(cur, _)| cur.sample_count())
            .collect();
        interval_of(&counts)
    }

    /// The trace of completed, non-empty-mode presences, each at
    /// likelihood 1.
    pub fn mode_trace(&self) -> ModeTrace {
        let mut trace = ModeTrace::new();
        for view in self.completed() {
            if !view.presence.mode.is_empty() {
                trace = trace.push_back(view.presence.mode.clone());
            }
        }
        trace
    }

    /// True iff `ts` falls within a presence whose mode has occurred at an
    /// earlier presence, and that earlier presence ran at least as many
    /// sample-acquiring frames as the current one has accumulated so far.
    pub fn can_look_ahead(&self, ts: Timestamp) -> bool {
        if ts > self.ts {
            return false;
        }
        let mut p_idx = None;
        for (i, v) in self.views.iter().enumerate() {
            if v.presence.from <= ts {
                p_idx = Some(i);
            } else {
                break;
            }
        }
        let Some(p_idx) = p_idx else { return false };
        let p = &self.views[p_idx];
        if p.presence.mode.is_empty() {
            return false;
        }
        let cur_count = p.entries_up_to(ts);
        self.views[..p_idx].iter().rev().find(|v| v.presence.mode == p.presence.mode).is_some_and(|q| cur_count <= q.sample_count())
    }

    fn completed(&self) -> impl Iterator<Item = &PresenceView> {
        let last = self.views.len().saturating_sub(1);
        self.views.iter().enumerate().filter(move |(i, _)| *i < last).map(|(_, v)| v)
    }

    fn adjacent_pairs(&self) -> impl Iterator<Item = (&PresenceView, &PresenceView)> {
        self.views.windows(2).map(|w| (&w[0], &w[1]))
    }
}

fn interval_of(counts: &[usize]) -> Interval<usize> {
    match (counts.iter().min(), counts.iter().max()) {
        (Some(&min), Some(&max)) => Interval::new(min, max),
        _ => Interval::new(0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copresence_types::BodySegment;

    fn robot() -> Body {
        Body::Robot {
            id: "r0".to_string(),
            message_frequency: 10,
            segments: vec![BodySegment::new("3", "2", 1.0), BodySegment::new("1", "0", 0.5)],
        }
    }

    fn frame(pts: &[(&str, f64, f64, f64)]) -> HashMap<String, Vec<Point>> {
        pts.iter().map(|(k, x, y, z)| (k.to_string(), vec![Point::new(*x, *y, *z)])).collect()
    }

    fn mode(name: &str) -> Mode {
        Mode::single("robot", name)
    }

    #[test]
    fn basics_presences_and_trace() {
        let mut history = RobotStateHistory::new(robot());
        let empty_mode = Mode::empty();

        {
            let snap = history.snapshot_at(0);
            assert_eq!(snap.mode_trace().size(), 0);
            assert!(snap.presences_in(&empty_mode).is_empty());
            assert!(snap.presences_exiting_into(&empty_mode).is_empty());
            assert!(snap.samples(&empty_mode).is_err());
            assert!(snap.modes_with_samples().is_empty());
        }

        history.acquire(mode("first"), &frame(&[("0", 0.0, 0.0, 0.0), ("1", 4.0, 4.0, 4.0), ("2", 0.0, 2.0, 0.0), ("3", 1.0, 0.0, 3.0)]), 500).unwrap();

        {
            let snap = history.snapshot_at(500);
            assert!(snap.samples(&mode("first")).is_err());
            assert!(snap.modes_with_samples().is_empty());
            assert!(!snap.can_look_ahead(500));
            assert_eq!(snap.mode_trace().size(), 0);
            let entrances = snap.presences_exiting_into(&mode("first"));
            assert_eq!(entrances.len(), 1);
            assert!(entrances[0].mode().is_empty());
            assert_eq!(entrances[0].to(), 500);
        }

        history.acquire(mode("first"), &frame(&[("0", 0.0, 0.0, 1.0), ("1", 4.0, 4.0, 5.0), ("2", 0.0, 3.0, 0.0), ("3", 1.0, 1.0, 3.0)]), 600).unwrap();
        history.acquire(mode("second"), &frame(&[("0", 0.0, 0.0, 1.5), ("1", 4.0, 4.0, 5.5), ("2", 0.0, 3.5, 0.0), ("3", 1.0, 1.5, 3.0)]), 700).unwrap();

        {
            let snap = history.snapshot_at(700);
            assert_eq!(*snap.mode_trace().ending_mode().unwrap(), mode("first"));
            assert_eq!(snap.modes_with_samples().len(), 1);
            assert!(!snap.can_look_ahead(700));
            assert_eq!(snap.presences_in(&mode("first")).len(), 1);
            let exiting = snap.presences_exiting_into(&mode("second"));
            assert_eq!(exiting.len(), 1);
            assert_eq!(*exiting[0].mode(), mode("first"));
            assert_eq!(exiting[0].from(), 500);
            assert_eq!(exiting[0].to(), 700);
            assert_eq!(snap.range_of_num_samples_in(&mode("first")), Interval::new(2, 2));
        }
    }

    #[test]
    fn look_ahead_requires_a_repeated_mode_with_spare_reference_frames() {
        let mut history = RobotStateHistory::new(robot());
        let pts = frame(&[("0", 0.0, 0.0, 0.0), ("1", 4.0, 4.0, 4.0), ("2", 0.0, 0.0, 0.0), ("3", 0.0, 0.0, 0.0)]);

        history.acquire(mode("first"), &pts, 0).unwrap();
        history.acquire(mode("first"), &pts, 100).unwrap();
        assert!(!history.snapshot_at(100).can_look_ahead(100));

        history.acquire(mode("second"), &pts, 200).unwrap();
        history.acquire(mode("second"), &pts, 300).unwrap();
        history.acquire(mode("second"), &pts, 400).unwrap();
        assert!(!history.snapshot_at(400).can_look_ahead(400));

        history.acquire(mode("third"), &pts, 500).unwrap();
        history.acquire(mode("third"), &pts, 600).unwrap();
        history.acquire(mode("second"), &pts, 700).unwrap();
        {
            let snap = history.snapshot_at(700);
            assert!(snap.can_look_ahead(700));
            assert!(!snap.can_look_ahead(100));
        }

        history.acquire(mode("second"), &pts, 800).unwrap();
        history.acquire(mode("first"), &pts, 900).unwrap();
        history.acquire(mode("first"), &pts, 1000).unwrap();
        assert!(history.snapshot_at(1000).can_look_ahead(1000));

        history.acquire(mode("first"), &pts, 1100).unwrap();
        assert!(!history.snapshot_at(1100).can_look_ahead(1100));
    }

    #[test]
    fn snapshot_rejects_far_future_look_ahead_queries() {
        let mut history = RobotStateHistory::new(robot());
        let pts = frame(&[("0", 0.0, 0.0, 0.0), ("1", 4.0, 4.0, 4.0), ("2", 0.0, 0.0, 0.0), ("3", 0.0, 0.0, 0.0)]);
        history.acquire(mode("first"), &pts, 500).unwrap();
        history.acquire(mode("second"), &pts, 700).unwrap();
        history.acquire(mode("first"), &pts, 800).unwrap();

        let snap = history.snapshot_at(800);
        assert!(!snap.can_look_ahead(500));
        assert!(snap.can_look_ahead(800));
        assert!(!snap.can_look_ahead(800_000_001));
    }

    #[test]
    fn analytics_scenario_matches_presence_statistics() {
        let mut history = RobotStateHistory::new(Body::Robot { id: "r0".to_string(), message_frequency: 10, segments: vec![BodySegment::new("0", "1", 1.0)] });
        let pts = |x: f64| frame(&[("0", x, 0.0, 0.0), ("1", 4.0, 4.0, 4.0)]);
        let sequence = ["first", "first", "second", "second", "second", "third", "third", "second", "second", "first", "first", "first", "third", "second", "fourth"];

        let mut ts = 0u64;
        for (i, m) in sequence.iter().enumerate() {
            history.acquire(mode(m), &pts(i as f64), ts).unwrap();
            ts += 100;
        }
        let snap = history.snapshot_at(ts);

        assert_eq!(*snap.mode_trace().ending_mode().unwrap(), mode("second"));
        assert_eq!(snap.presences_in(&mode("first")).len(), 2);
        assert_eq!(snap.presences_in(&mode("second")).len(), 3);
        assert_eq!(snap.presences_in(&mode("third")).len(), 2);
        assert_eq!(snap.presences_in(&mode("fourth")).len(), 0);

        assert_eq!(snap.presences_exiting_into(&mode("first")).len(), 2);
        assert_eq!(snap.presences_exiting_into(&mode("second")).len(), 3);
        assert_eq!(snap.presences_exiting_into(&mode("third")).len(), 2);
        assert_eq!(snap.presences_exiting_into(&mode("fourth")).len(), 1);

        assert_eq!(snap.range_of_num_samples_in(&mode("first")), Interval::new(2, 3));
        assert_eq!(snap.range_of_num_samples_in(&mode("second")), Interval::new(1, 3));
        assert_eq!(snap.range_of_num_samples_in(&mode("third")), Interval::new(1, 2));
        assert_eq!(snap.range_of_num_samples_in(&mode("fourth")), Interval::new(0, 0));

        assert_eq!(snap.presences_between(&mode("first"), &mode("third")).len(), 1);
        assert_eq!(snap.presences_between(&mode("third"), &mode("second")).len(), 2);
        assert_eq!(snap.presences_between(&mode("third"), &mode("first")).len(), 0);

        assert_eq!(snap.range_of_num_samples_in_pair(&mode("first"), &mode("second")), Interval::new(2, 2));
        assert_eq!(snap.range_of_num_samples_in_pair(&mode("first"), &mode("third")), Interval::new(3, 3));
        assert_eq!(snap.range_of_num_samples_in_pair(&mode("third"), &mode("second")), Interval::new(1, 2));
    }
}
