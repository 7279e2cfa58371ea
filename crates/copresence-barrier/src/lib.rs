//! Forward minimum-distance tracking between one human sample and a
//! forward-ordered walk of robot samples.
//!
//! Walking a robot history forward from a look-ahead job's anchor point
//! produces a long run of samples; naively recomputing the human-to-robot
//! distance at every step and keeping a running minimum would throw away
//! the fact that most of that minimum is already known once a job resumes
//! from a nearby point. A [`SphereMinimumDistanceBarrierSequenceSection`]
//! keeps the run-length-encoded form of that minimum — a sequence of
//! [`Barrier`]s, each a `(distance, index range)` pair — so a job that
//! shifts its anchor by one sample can reuse most of the sequence instead
//! of rewalking it.
//!
//! | Type | Role |
//! |------|------|
//! | [`PathKey`] | Which segment pair and sample index a barrier was measured against. |
//! | [`IndexRange`] | The contiguous run of sample indices a barrier's distance held for. |
//! | [`Barrier`] | One run: a distance and the index range achieving it. |
//! | [`SphereMinimumDistanceBarrierSequenceSection`] | The walk: incremental update plus prefix reuse. |

use copresence_geometry::BodySegmentSample;

/// Which segment pair and sample index a [`Barrier`] (or a
/// [`SphereMinimumDistanceBarrierSequenceSection::check_and_update`] call)
/// refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathKey {
    pub segment: usize,
    pub sample_index: usize,
}

impl PathKey {
    pub fn new(segment: usize, sample_index: usize) -> Self {
        Self { segment, sample_index }
    }
}

/// The contiguous run of sample indices over which a [`Barrier`]'s
/// distance is the prefix minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    min: usize,
    max: usize,
}

impl IndexRange {
    fn singleton(index: usize) -> Self {
        Self { min: index, max: index }
    }

    pub fn minimum_sample_index(&self) -> usize {
        self.min
    }

    pub fn maximum_sample_index(&self) -> usize {
        self.max
    }
}

/// A prefix-minimum distance and the run of sample indices it was achieved
/// over: `d_k = min_{i<=k} distance_to(H, R_i)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barrier {
    distance: f64,
    range: IndexRange,
    path: PathKey,
}

impl Barrier {
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn range(&self) -> IndexRange {
        self.range
    }

    /// The path the barrier's distance was last measured against (the
    /// most recent sample folded into its range).
    pub fn path(&self) -> PathKey {
        self.path
    }
}

/// Maintains the barrier sequence of a fixed human sample against a
/// forward-ordered walk of robot samples.
///
/// Construct anchored to a human sample with [`Self::new`], feed robot
/// samples in index order through [`Self::check_and_update`], and read the
/// accumulated run-length form with [`Self::barriers`] or
/// [`Self::last_barrier`]. When a job's anchor moves to a new human sample,
/// [`Self::reset`] keeps whatever prefix of the sequence is still valid
/// for it instead of discarding everything.
#[derive(Debug, Clone)]
pub struct SphereMinimumDistanceBarrierSequenceSection {
    human_sample: BodySegmentSample,
    barriers: Vec<Barrier>,
}

impl SphereMinimumDistanceBarrierSequenceSection {
    pub fn new(human_sample: BodySegmentSample) -> Self {
        Self { human_sample, barriers: Vec::new() }
    }

    pub fn human_sample(&self) -> &BodySegmentSample {
        &self.human_sample
    }

    pub fn barriers(&self) -> &[Barrier] {
        &self.barriers
    }

    pub fn last_barrier(&self) -> Option<&Barrier> {
        self.barriers.last()
    }

    /// Fold in the next robot sample at `path`.
    ///
    /// Extends the last barrier's range when `distance_to(human, robot)`
    /// exceeds it (the prefix minimum hasn't changed); otherwise starts a
    /// new barrier at this index. Returns `false` when the new barrier's
    /// distance is zero — contact, halt the walk — and `true` otherwise.
    pub fn check_and_update(&mut self, robot_sample: &BodySegmentSample, path: PathKey) -> bool {
        let distance = self.human_sample.distance_to(robot_sample);
        match self.barriers.last_mut() {
            Some(last) if distance > last.distance => {
                last.range.max = path.sample_index;
                last.path = path;
                true
            }
            _ => {
                self.barriers.push(Barrier { distance, range: IndexRange::singleton(path.sample_index), path });
                distance > 0.0
            }
        }
    }

    /// Re-anchor the section to `new_human_sample`, keeping the prefix of
    /// barriers whose distance remains valid for it (conservatively: the
    /// combined error envelope of the old and new anchor covers any change
    /// in the barrier's recorded distance) and whose achieving index is
    /// `<= keep_up_to_index`. Barriers past that point are dropped; the
    /// caller resumes `check_and_update` from `last_barrier`'s range.
    pub fn reset(&mut self, new_human_sample: BodySegmentSample, _path: PathKey, keep_up_to_index: usize) {
        let reuse_to = self.reuse_element(&new_human_sample).min(keep_up_to_index + 1);
        self.barriers.truncate(reuse_to);
        self.human_sample = new_human_sample;
    }

    /// Binary search for the deepest prefix of barriers still valid for
    /// `new_human_sample`: a barrier is reusable as long as its recorded
    /// distance clears the combined error envelope of the old and new
    /// anchor sample, so the new anchor couldn't plausibly have reordered
    /// it or pushed it to contact. Barrier distances fall monotonically
    /// with index, so the reusable prefix is contiguous from the start.
    fn reuse_element(&self, new_human_sample: &BodySegmentSample) -> usize {
        let tolerance = self.human_sample.error() + new_human_sample.error();
        let mut lo = 0usize;
        let mut hi = self.barriers.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.barriers[mid].distance > tolerance {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }
}
