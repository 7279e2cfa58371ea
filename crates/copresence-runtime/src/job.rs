//! Look-ahead jobs: per-(human segment, robot segment) collision walks.
//!
//! A job anchors one human sample against a recurring robot mode and walks
//! the robot's future samples in that mode forward, feeding them to a
//! [`SphereMinimumDistanceBarrierSequenceSection`] as they become available.
//! `awaken` is the resumption step; [`JobFactory`] is the seam a concrete
//! collision-notification policy plugs into.

use std::sync::atomic::{AtomicU64, Ordering};

use copresence_barrier::{PathKey, SphereMinimumDistanceBarrierSequenceSection};
use copresence_geometry::BodySegmentSample;
use copresence_history::RobotHistorySnapshot;
use copresence_mode::{merge, ModeTrace};
use copresence_types::Timestamp;

pub type JobId = u64;

/// Whether an `awaken` call changed the job's minimum-distance barrier, or
/// merely extended the range of the one already found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAwakeningResult {
    Same,
    Different,
}

/// One (human_id, robot_id) pair's look-ahead state for one segment pair.
pub struct LookAheadJob {
    id: JobId,
    pair_id: (String, String),
    human_segment: usize,
    robot_segment: usize,
    snapshot_time: Timestamp,
    human_sample: Option<BodySegmentSample>,
    mode_trace: ModeTrace,
    barrier: Option<SphereMinimumDistanceBarrierSequenceSection>,
    next_sample_index: usize,
    path: PathKey,
}

impl LookAheadJob {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn pair_id(&self) -> &(String, String) {
        &self.pair_id
    }

    pub fn human_segment(&self) -> usize {
        self.human_segment
    }

    pub fn robot_segment(&self) -> usize {
        self.robot_segment
    }

    pub fn snapshot_time(&self) -> Timestamp {
        self.snapshot_time
    }

    pub fn human_sample(&self) -> Option<&BodySegmentSample> {
        self.human_sample.as_ref()
    }

    pub fn mode_trace(&self) -> &ModeTrace {
        &self.mode_trace
    }

    pub fn barrier(&self) -> Option<&SphereMinimumDistanceBarrierSequenceSection> {
        self.barrier.as_ref()
    }

    /// A sleeping job has no anchoring human sample yet.
    pub fn is_sleeping(&self) -> bool {
        self.human_sample.is_none()
    }

    pub fn path(&self) -> PathKey {
        self.path
    }
}

/// Creates new jobs and resumes sleeping ones; the policy that decides what
/// a repeated close approach means is external to this crate.
pub trait JobFactory {
    #[allow(clippy::too_many_arguments)]
    fn create_new_job(
        &self,
        pair_id: (String, String),
        human_segment: usize,
        robot_segment: usize,
        timestamp: Timestamp,
        human_sample: Option<BodySegmentSample>,
        initial_mode_trace: ModeTrace,
        path: PathKey,
    ) -> LookAheadJob;

    fn awaken(
        &self,
        job: LookAheadJob,
        timestamp: Timestamp,
        new_human_sample: BodySegmentSample,
        robot_history: &RobotHistorySnapshot,
    ) -> Vec<(LookAheadJob, JobAwakeningResult)>;
}

/// Reference [`JobFactory`]: walks the robot's recurring-mode samples
/// forward against the job's anchor, treating a genuinely new (closer, or
/// contact) barrier as [`JobAwakeningResult::Different`] and a widened
/// range on the existing one as [`JobAwakeningResult::Same`].
#[derive(Default)]
pub struct DefaultJobFactory {
    next_id: AtomicU64,
}

impl DefaultJobFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobFactory for DefaultJobFactory {
    fn create_new_job(
        &self,
        pair_id: (String, String),
        human_segment: usize,
        robot_segment: usize,
        timestamp: Timestamp,
        human_sample: Option<BodySegmentSample>,
        initial_mode_trace: ModeTrace,
        path: PathKey,
    ) -> LookAheadJob {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let barrier = human_sample.map(SphereMinimumDistanceBarrierSequenceSection::new);
        LookAheadJob {
            id,
            pair_id,
            human_segment,
            robot_segment,
            snapshot_time: timestamp,
            human_sample,
            mode_trace: initial_mode_trace,
            barrier,
            next_sample_index: 0,
            path,
        }
    }

    fn awaken(
        &self,
        mut job: LookAheadJob,
        timestamp: Timestamp,
        new_human_sample: BodySegmentSample,
        robot_history: &RobotHistorySnapshot,
    ) -> Vec<(LookAheadJob, JobAwakeningResult)> {
        let merged_trace = merge(&job.mode_trace, &robot_history.mode_trace());

        let Some(target_mode) = job.mode_trace.ending_mode().cloned() else {
            job.mode_trace = merged_trace;
            job.human_sample = Some(new_human_sample);
            job.snapshot_time = timestamp;
            return vec![(job, JobAwakeningResult::Same)];
        };

        let mut result = JobAwakeningResult::Same;
        if let Ok(samples_by_segment) = robot_history.samples(&target_mode) {
            if let Some(segment_samples) = samples_by_segment.get(job.robot_segment) {
                let mut barrier = job.barrier.take().unwrap_or_else(|| SphereMinimumDistanceBarrierSequenceSection::new(new_human_sample));
                for i in job.next_sample_index..segment_samples.len() {
                    let before = barrier.barriers().len();
                    barrier.check_and_update(&segment_samples[i], PathKey::new(job.robot_segment, i));
                    result = if barrier.barriers().len() > before { JobAwakeningResult::Different } else { JobAwakeningResult::Same };
                }
                job.next_sample_index = segment_samples.len();
                job.barrier = Some(barrier);
            }
        }

        job.mode_trace = merged_trace;
        job.human_sample = Some(new_human_sample);
        job.snapshot_time = timestamp;
        vec![(job, result)]
    }
}
