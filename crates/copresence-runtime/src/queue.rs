//! [`JobQueue`]: a synchronised FIFO used for both the waiting and
//! sleeping job queues.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::job::LookAheadJob;

struct State {
    jobs: VecDeque<LookAheadJob>,
    shutdown: bool,
}

/// A blocking, internally synchronised job queue.
///
/// `dequeue` blocks until a job is available or [`Self::shut_down`] has been
/// called, at which point it returns `None` and every further call returns
/// `None` immediately.
pub struct JobQueue {
    state: Mutex<State>,
    not_empty: Condvar,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self { state: Mutex::new(State { jobs: VecDeque::new(), shutdown: false }), not_empty: Condvar::new() }
    }

    /// Push a job to the back of the queue, waking one blocked dequeuer.
    pub fn enqueue(&self, job: LookAheadJob) {
        let mut state = self.state.lock().expect("job queue mutex poisoned");
        state.jobs.push_back(job);
        self.not_empty.notify_one();
    }

    /// Reserve space for `additional` more jobs without allocating per push.
    pub fn reserve(&self, additional: usize) {
        let mut state = self.state.lock().expect("job queue mutex poisoned");
        state.jobs.reserve(additional);
    }

    /// Block until a job is available, the queue is shut down, or `None` is
    /// returned because shutdown already fired.
    pub fn dequeue(&self) -> Option<LookAheadJob> {
        let mut state = self.state.lock().expect("job queue mutex poisoned");
        loop {
            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }
            if state.shutdown {
                return None;
            }
            state = self.not_empty.wait(state).expect("job queue mutex poisoned");
        }
    }

    /// Remove and return every job currently queued, without blocking.
    pub fn drain(&self) -> Vec<LookAheadJob> {
        let mut state = self.state.lock().expect("job queue mutex poisoned");
        state.jobs.drain(..).collect()
    }

    pub fn size(&self) -> usize {
        self.state.lock().expect("job queue mutex poisoned").jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Wake every blocked `dequeue` call; they return `None` once drained.
    pub fn shut_down(&self) {
        let mut state = self.state.lock().expect("job queue mutex poisoned");
        state.shutdown = true;
        self.not_empty.notify_all();
    }
}
