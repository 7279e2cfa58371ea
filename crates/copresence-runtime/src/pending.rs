//! [`PendingPairs`]: (human, robot) pairs awaiting promotion into jobs.

/// The list of (human id, robot id) pairs not yet promoted into a
/// look-ahead job, because the human has no usable sample yet or the
/// robot's history can't look ahead yet.
#[derive(Default)]
pub struct PendingPairs {
    pairs: Vec<(String, String)>,
}

impl PendingPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, human_id: impl Into<String>, robot_id: impl Into<String>) {
        let pair = (human_id.into(), robot_id.into());
        if !self.pairs.contains(&pair) {
            self.pairs.push(pair);
        }
    }

    /// Add `(every_human_id, robot_id)` for a newly presented robot.
    pub fn seed_for_robot<'a>(&mut self, robot_id: &str, human_ids: impl IntoIterator<Item = &'a String>) {
        for human_id in human_ids {
            self.add(human_id.clone(), robot_id.to_string());
        }
    }

    /// Add `(human_id, every_robot_id)` for a newly auto-registered human.
    pub fn seed_for_human<'a>(&mut self, human_id: &str, robot_ids: impl IntoIterator<Item = &'a String>) {
        for robot_id in robot_ids {
            self.add(human_id.to_string(), robot_id.clone());
        }
    }

    pub fn remove_referencing(&mut self, human_id: &str) {
        self.pairs.retain(|(h, _)| h != human_id);
    }

    pub fn remove(&mut self, pair: &(String, String)) {
        self.pairs.retain(|p| p != pair);
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
