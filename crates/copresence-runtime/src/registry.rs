//! [`BodyRegistry`]: registered bodies and their observation histories.

use std::collections::HashMap;

use copresence_history::{HumanStateHistory, RobotStateHistory};
use copresence_types::{Body, BodyIdentity, Timestamp};

/// Every body the dispatcher knows about, plus each one's running
/// observation history.
///
/// A human registered without ever being presented (an auto-registration,
/// see [`copresence_types::default_human_presentation`]) is indistinguishable
/// from one presented explicitly — both simply call [`Self::register`].
#[derive(Default)]
pub struct BodyRegistry {
    bodies: HashMap<String, Body>,
    human_histories: HashMap<String, HumanStateHistory>,
    robot_histories: HashMap<String, RobotStateHistory>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body`, creating its (empty) history if this id hasn't
    /// been seen before. Re-registering an existing id updates the static
    /// shape but keeps the history accumulated so far.
    pub fn register(&mut self, body: Body) {
        let id = body.id().to_string();
        if body.is_human() {
            self.human_histories.entry(id.clone()).or_insert_with(|| HumanStateHistory::new(body.clone()));
        } else {
            self.robot_histories.entry(id.clone()).or_insert_with(|| RobotStateHistory::new(body.clone()));
        }
        self.bodies.insert(id, body);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bodies.contains_key(id)
    }

    pub fn body(&self, id: &str) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn is_human(&self, id: &str) -> Option<bool> {
        self.bodies.get(id).map(|b| b.is_human())
    }

    pub fn human_history(&self, id: &str) -> Option<&HumanStateHistory> {
        self.human_histories.get(id)
    }

    pub fn human_history_mut(&mut self, id: &str) -> Option<&mut HumanStateHistory> {
        self.human_histories.get_mut(id)
    }

    pub fn robot_history(&self, id: &str) -> Option<&RobotStateHistory> {
        self.robot_histories.get(id)
    }

    pub fn robot_history_mut(&mut self, id: &str) -> Option<&mut RobotStateHistory> {
        self.robot_histories.get_mut(id)
    }

    pub fn human_ids(&self) -> impl Iterator<Item = &String> {
        self.human_histories.keys()
    }

    pub fn robot_ids(&self) -> impl Iterator<Item = &String> {
        self.robot_histories.keys()
    }

    /// For every history whose span exceeds `1000*(retention_ms+purge_period_ms)`,
    /// drop entries older than `latest - 1000*retention_ms`.
    pub fn remove_old_history(&mut self, retention_ms: u64, purge_period_ms: u64) {
        for history in self.human_histories.values_mut() {
            if let (Ok(latest), Ok(earliest)) = (history.latest_time(), history.earliest_time()) {
                if latest.saturating_sub(earliest) > 1000 * (retention_ms + purge_period_ms) {
                    history.remove_older_than(latest.saturating_sub(1000 * retention_ms));
                }
            }
        }
    }

    /// Remove every human whose latest observation predates
    /// `latest_message_ts - timeout_ms`; returns the removed ids so the
    /// caller can also drop their sleeping jobs and pending pairs.
    pub fn remove_unresponding_humans(&mut self, latest_message_ts: Timestamp, timeout_ms: u64) -> Vec<String> {
        let cutoff = latest_message_ts.saturating_sub(timeout_ms);
        let stale: Vec<String> = self
            .human_histories
            .iter()
            .filter(|(_, history)| history.latest_time().is_ok_and(|ts| ts < cutoff))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            self.human_histories.remove(id);
            self.bodies.remove(id);
        }
        stale
    }
}
