//! [`Dispatcher`]: the registry-maintenance critical section run on every
//! incoming state message, plus the waiting-job processing step.

use std::sync::{Arc, Mutex};

use copresence_types::{
    default_human_presentation, Body, BodyIdentity, BodyPresentationMessage, HumanStateMessage, Interval, RobotStateMessage, Timestamp,
};

use crate::job::{JobAwakeningResult, JobFactory};
use crate::outbound::OutboundQueue;
use crate::pending::PendingPairs;
use crate::queue::JobQueue;
use crate::registry::BodyRegistry;
use crate::telemetry::{init_tracing, TracerProviderGuard};

/// The three configuration values presented into the dispatcher's
/// constructor (the fourth, the default human presentation fixture, is
/// [`copresence_types::default_human_presentation`]).
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    pub history_retention_ms: u64,
    pub history_purge_period_ms: u64,
    pub human_retention_timeout_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { history_retention_ms: 60_000, history_purge_period_ms: 10_000, human_retention_timeout_ms: 5_000 }
    }
}

/// Owns the registry, the pending-pairs list and the two job queues, and
/// runs the registry-maintenance critical section for each incoming
/// message. Generic over the job factory so a concrete collision policy can
/// be substituted in tests.
pub struct Dispatcher<F: JobFactory> {
    registry: Mutex<BodyRegistry>,
    pending: Mutex<PendingPairs>,
    waiting: Arc<JobQueue>,
    sleeping: Arc<JobQueue>,
    outbound: OutboundQueue,
    factory: F,
    config: DispatcherConfig,
}

impl<F: JobFactory> Dispatcher<F> {
    pub fn new(factory: F, config: DispatcherConfig, outbound: OutboundQueue) -> Self {
        Self {
            registry: Mutex::new(BodyRegistry::new()),
            pending: Mutex::new(PendingPairs::new()),
            waiting: Arc::new(JobQueue::new()),
            sleeping: Arc::new(JobQueue::new()),
            outbound,
            factory,
            config,
        }
    }

    /// Initialise the global `tracing` subscriber and construct the
    /// dispatcher in one step. This is the startup path a hosting process
    /// calls once; `new` stays available for tests and for callers that
    /// manage their own subscriber.
    pub fn bootstrap(factory: F, config: DispatcherConfig, outbound: OutboundQueue, service_name: &str) -> (Self, TracerProviderGuard) {
        let guard = init_tracing(service_name);
        (Self::new(factory, config, outbound), guard)
    }

    pub fn waiting_queue(&self) -> Arc<JobQueue> {
        self.waiting.clone()
    }

    pub fn sleeping_queue(&self) -> Arc<JobQueue> {
        self.sleeping.clone()
    }

    /// `make_body_presentation_subscriber` callback: registers the body and
    /// seeds pending pairs against every already-known body of the
    /// opposite kind.
    #[tracing::instrument(skip(self, msg), fields(body_id = %msg.id, is_human = msg.is_human))]
    pub fn handle_body_presentation(&self, msg: BodyPresentationMessage) {
        let body = if msg.is_human {
            Body::Human { id: msg.id.clone(), segments: msg.segments() }
        } else {
            Body::Robot { id: msg.id.clone(), message_frequency: msg.frequency.unwrap_or(0), segments: msg.segments() }
        };

        let mut registry = self.registry.lock().expect("registry mutex poisoned");
        let mut pending = self.pending.lock().expect("pending-pairs mutex poisoned");
        let is_human = body.is_human();
        registry.register(body);
        if is_human {
            pending.seed_for_human(&msg.id, registry.robot_ids());
        } else {
            pending.seed_for_robot(&msg.id, registry.human_ids());
        }
    }

    /// `make_human_state_subscriber` callback.
    #[tracing::instrument(skip(self, msg), fields(human_count = msg.bodies.len(), timestamp = msg.timestamp))]
    pub fn handle_human_state(&self, msg: HumanStateMessage) {
        let mut registry = self.registry.lock().expect("registry mutex poisoned");
        let mut pending = self.pending.lock().expect("pending-pairs mutex poisoned");

        for id in msg.bodies.keys() {
            if !registry.contains(id) {
                registry.register(default_human_presentation(id.clone()));
                pending.seed_for_human(id, registry.robot_ids());
            }
        }

        for (id, points_by_keypoint) in &msg.bodies {
            if let Some(history) = registry.human_history_mut(id) {
                if let Err(err) = history.acquire(points_by_keypoint, msg.timestamp) {
                    tracing::warn!(human_id = %id, %err, "dropping out-of-order or malformed human state");
                }
            }
        }

        self.run_maintenance(&mut registry, &mut pending, msg.timestamp);
    }

    /// `make_robot_state_subscriber` callback.
    #[tracing::instrument(skip(self, msg), fields(robot_id = %msg.id, timestamp = msg.timestamp))]
    pub fn handle_robot_state(&self, msg: RobotStateMessage) {
        let mut registry = self.registry.lock().expect("registry mutex poisoned");
        let mut pending = self.pending.lock().expect("pending-pairs mutex poisoned");

        if !registry.contains(&msg.id) {
            tracing::warn!(robot_id = %msg.id, "discarding robot state for unregistered id");
            return;
        }

        let points_by_segment = segment_points(&msg);
        if let Some(history) = registry.robot_history_mut(&msg.id) {
            if let Err(err) = history.acquire(msg.mode, &points_by_segment, msg.timestamp) {
                tracing::warn!(robot_id = %msg.id, %err, "dropping out-of-order robot state");
            }
        }

        self.run_maintenance(&mut registry, &mut pending, msg.timestamp);
    }

    fn run_maintenance(&self, registry: &mut BodyRegistry, pending: &mut PendingPairs, latest_message_ts: Timestamp) {
        registry.remove_old_history(self.config.history_retention_ms, self.config.history_purge_period_ms);

        for human_id in registry.remove_unresponding_humans(latest_message_ts, self.config.human_retention_timeout_ms) {
            pending.remove_referencing(&human_id);
            for job in self.sleeping.drain() {
                if job.pair_id().0 != human_id {
                    self.sleeping.enqueue(job);
                }
            }
        }

        self.move_sleeping_jobs_to_waiting(registry);
        self.promote_pending_pairs(registry, pending);
    }

    fn move_sleeping_jobs_to_waiting(&self, registry: &BodyRegistry) {
        for job in self.sleeping.drain() {
            let (human_id, robot_id) = job.pair_id().clone();
            let (Some(human_history), Some(robot_history)) = (registry.human_history(&human_id), registry.robot_history(&robot_id)) else {
                self.sleeping.enqueue(job);
                continue;
            };
            let Ok(robot_latest) = robot_history.latest_time() else {
                self.sleeping.enqueue(job);
                continue;
            };
            let snapshot = robot_history.snapshot_at(job.snapshot_time());
            let human_segment = job.human_segment();
            let fresh_sample = human_history
                .latest_within(robot_latest)
                .ok()
                .and_then(|instance| instance.samples().get(human_segment).and_then(|s| s.first()).cloned());

            match fresh_sample {
                Some(sample) if snapshot.can_look_ahead(job.snapshot_time()) => {
                    for (awakened, result) in self.factory.awaken(job, robot_latest, sample, &snapshot) {
                        match result {
                            JobAwakeningResult::Different => self.waiting.enqueue(awakened),
                            JobAwakeningResult::Same => self.sleeping.enqueue(awakened),
                        }
                    }
                }
                _ => self.sleeping.enqueue(job),
            }
        }
    }

    fn promote_pending_pairs(&self, registry: &BodyRegistry, pending: &mut PendingPairs) {
        let candidates: Vec<(String, String)> = pending.iter().cloned().collect();
        let mut promoted = Vec::new();

        for pair @ (human_id, robot_id) in &candidates {
            let (Some(human_history), Some(robot_history)) = (registry.human_history(human_id), registry.robot_history(robot_id)) else {
                continue;
            };
            let Ok(robot_latest) = robot_history.latest_time() else { continue };
            let Ok(instance) = human_history.latest_within(robot_latest) else { continue };
            let snapshot = robot_history.snapshot_at(robot_latest);
            if !snapshot.can_look_ahead(robot_latest) {
                continue;
            }

            let human_segments = instance.samples().len();
            let robot_segments = registry.body(robot_id).map(|b| b.segments().len()).unwrap_or(0);

            for human_segment in 0..human_segments {
                let sample = instance.samples().get(human_segment).and_then(|s| s.first()).cloned();
                let human_sample = sample.filter(|s| !s.is_degenerate());
                for robot_segment in 0..robot_segments {
                    let path = copresence_barrier::PathKey::new(robot_segment, 0);
                    let job =
                        self.factory.create_new_job(pair.clone(), human_segment, robot_segment, robot_latest, human_sample, snapshot.mode_trace(), path);
                    if human_sample.is_some() {
                        self.waiting.enqueue(job);
                    } else {
                        self.sleeping.enqueue(job);
                    }
                }
            }
            promoted.push(pair.clone());
        }

        for pair in promoted {
            pending.remove(&pair);
        }
    }

    /// Dequeue one waiting job (blocking), publish a notification from its
    /// current barrier state, and return it to the sleeping queue for
    /// continued monitoring. Returns `false` once the waiting queue has
    /// been shut down and drained, signalling the caller to stop looping.
    pub fn process_one_waiting_job(&self) -> bool {
        let Some(job) = self.waiting.dequeue() else { return false };
        let span = tracing::debug_span!("process_waiting_job", human_id = %job.pair_id().0, robot_id = %job.pair_id().1, job_id = job.id());
        let _enter = span.enter();
        if let Some(barrier) = job.barrier() {
            if let Some(last) = barrier.last_barrier() {
                tracing::debug!(distance = last.distance(), "publishing collision notification");
                let (human_id, robot_id) = job.pair_id().clone();
                self.outbound.push(copresence_types::CollisionNotificationMessage {
                    human_id,
                    human_segment: job.human_segment(),
                    robot_id,
                    robot_segment: job.robot_segment(),
                    current_time: job.snapshot_time(),
                    distance_interval: Interval::new(last.distance(), last.distance()),
                    collision_mode: job.mode_trace().ending_mode().cloned().unwrap_or_else(copresence_mode::Mode::empty),
                    likelihood: job.mode_trace().likelihood(),
                });
            }
        }
        self.sleeping.enqueue(job);
        true
    }

    pub fn shut_down(&self) {
        self.waiting.shut_down();
        self.sleeping.shut_down();
        self.outbound.shut_down();
    }
}

fn segment_points(msg: &RobotStateMessage) -> std::collections::HashMap<String, Vec<copresence_geometry::Point>> {
    let mut map = std::collections::HashMap::new();
    for (i, sample) in msg.points_per_segment.iter().enumerate() {
        map.insert(format!("{i}:head"), sample.heads.clone());
        map.insert(format!("{i}:tail"), sample.tails.clone());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::DefaultJobFactory;
    use copresence_geometry::Point;
    use copresence_mode::Mode;
    use copresence_types::{HumanStateMessage, SegmentPointSample};
    use std::collections::HashMap;

    fn dispatcher() -> Dispatcher<DefaultJobFactory> {
        Dispatcher::new(DefaultJobFactory::new(), DispatcherConfig::default(), OutboundQueue::new())
    }

    fn present_human(d: &Dispatcher<DefaultJobFactory>, id: &str) {
        d.handle_body_presentation(BodyPresentationMessage {
            id: id.to_string(),
            is_human: true,
            segment_pairs: vec![("0:head".to_string(), "0:tail".to_string())],
            thicknesses: vec![0.2],
            frequency: None,
        });
    }

    fn present_robot(d: &Dispatcher<DefaultJobFactory>, id: &str) {
        d.handle_body_presentation(BodyPresentationMessage {
            id: id.to_string(),
            is_human: false,
            segment_pairs: vec![("0:head".to_string(), "0:tail".to_string())],
            thicknesses: vec![0.2],
            frequency: Some(30),
        });
    }

    #[test]
    fn bootstrap_initialises_tracing_and_returns_a_usable_dispatcher() {
        let (d, _guard) = Dispatcher::bootstrap(DefaultJobFactory::new(), DispatcherConfig::default(), OutboundQueue::new(), "copresence-test");
        present_human(&d, "h0");
        assert!(d.registry.lock().unwrap().contains("h0"));
    }

    #[test]
    fn presenting_a_robot_after_a_human_seeds_a_pending_pair() {
        let d = dispatcher();
        present_human(&d, "h0");
        present_robot(&d, "r0");
        assert_eq!(d.pending.lock().unwrap().len(), 1);
    }

    #[test]
    fn unknown_robot_state_is_discarded_without_panicking() {
        let d = dispatcher();
        d.handle_robot_state(RobotStateMessage {
            id: "ghost".to_string(),
            mode: Mode::single("robot", "idle"),
            points_per_segment: vec![SegmentPointSample { heads: vec![Point::zero()], tails: vec![Point::zero()] }],
            timestamp: 100,
        });
        assert!(!d.registry.lock().unwrap().contains("ghost"));
    }

    #[test]
    fn human_state_for_an_unpresented_id_auto_registers_and_pairs_with_robots() {
        let d = dispatcher();
        present_robot(&d, "r0");

        let mut bodies = HashMap::new();
        bodies.insert("h0".to_string(), HashMap::from([("head".to_string(), vec![Point::zero()]), ("torso".to_string(), vec![Point::new(0.0, 1.0, 0.0)])]));
        d.handle_human_state(HumanStateMessage { bodies, timestamp: 100 });

        assert!(d.registry.lock().unwrap().contains("h0"));
        assert_eq!(d.pending.lock().unwrap().len(), 1);
    }

    #[test]
    fn promotion_requires_a_robot_mode_that_has_repeated() {
        let d = dispatcher();
        present_human(&d, "h0");
        present_robot(&d, "r0");

        let frame = |x: f64| HashMap::from([("0:head".to_string(), vec![Point::new(x, 0.0, 0.0)]), ("0:tail".to_string(), vec![Point::new(x, 1.0, 0.0)])]);
        d.handle_human_state(HumanStateMessage { bodies: HashMap::from([("h0".to_string(), frame(0.0))]), timestamp: 100 });

        d.handle_robot_state(RobotStateMessage {
            id: "r0".to_string(),
            mode: Mode::single("robot", "reaching"),
            points_per_segment: vec![SegmentPointSample { heads: vec![Point::new(10.0, 0.0, 0.0)], tails: vec![Point::new(10.0, 1.0, 0.0)] }],
            timestamp: 200,
        });
        assert_eq!(d.waiting.size() + d.sleeping.size(), 0);
        assert_eq!(d.pending.lock().unwrap().len(), 1);

        d.handle_robot_state(RobotStateMessage {
            id: "r0".to_string(),
            mode: Mode::single("robot", "idle"),
            points_per_segment: vec![SegmentPointSample { heads: vec![Point::new(0.0, 0.0, 0.0)], tails: vec![Point::new(0.0, 1.0, 0.0)] }],
            timestamp: 300,
        });
        d.handle_robot_state(RobotStateMessage {
            id: "r0".to_string(),
            mode: Mode::single("robot", "reaching"),
            points_per_segment: vec![SegmentPointSample { heads: vec![Point::new(8.0, 0.0, 0.0)], tails: vec![Point::new(8.0, 1.0, 0.0)] }],
            timestamp: 400,
        });
        d.handle_robot_state(RobotStateMessage {
            id: "r0".to_string(),
            mode: Mode::single("robot", "idle"),
            points_per_segment: vec![SegmentPointSample { heads: vec![Point::new(0.0, 0.0, 0.0)], tails: vec![Point::new(0.0, 1.0, 0.0)] }],
            timestamp: 500,
        });

        assert!(d.pending.lock().unwrap().is_empty());
        assert_eq!(d.waiting.size() + d.sleeping.size(), 1);
    }
}
