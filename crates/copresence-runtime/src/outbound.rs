//! [`OutboundQueue`] and [`Sender`]: the condition-variable-driven hop
//! between the job processor and the collision-notification publisher.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use copresence_middleware::Publisher;
use copresence_types::CollisionNotificationMessage;

struct State {
    messages: VecDeque<CollisionNotificationMessage>,
    shutdown: bool,
}

/// FIFO of notifications awaiting publication.
#[derive(Clone)]
pub struct OutboundQueue {
    state: Arc<Mutex<State>>,
    not_empty: Arc<Condvar>,
}

impl Default for OutboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(State { messages: VecDeque::new(), shutdown: false })), not_empty: Arc::new(Condvar::new()) }
    }

    pub fn push(&self, message: CollisionNotificationMessage) {
        let mut state = self.state.lock().expect("outbound queue mutex poisoned");
        state.messages.push_back(message);
        self.not_empty.notify_one();
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("outbound queue mutex poisoned").messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shut_down(&self) {
        let mut state = self.state.lock().expect("outbound queue mutex poisoned");
        state.shutdown = true;
        self.not_empty.notify_all();
    }

    /// Block until the queue is nonempty or shut down; drain whatever is
    /// present (possibly nothing, on shutdown) into `sink`. Returns `false`
    /// once shutdown has fired and nothing remains, signalling the caller
    /// to stop looping.
    fn drain_or_wait(&self, sink: &mut Vec<CollisionNotificationMessage>) -> bool {
        let mut state = self.state.lock().expect("outbound queue mutex poisoned");
        loop {
            if !state.messages.is_empty() {
                sink.extend(state.messages.drain(..));
                return true;
            }
            if state.shutdown {
                return false;
            }
            state = self.not_empty.wait(state).expect("outbound queue mutex poisoned");
        }
    }
}

/// The background worker that blocks on the outbound queue's condition
/// variable and republishes every notification it drains, in dequeue order.
pub struct Sender {
    queue: OutboundQueue,
    handle: Option<JoinHandle<()>>,
}

impl Sender {
    /// Spawn the sender thread, publishing onto `publisher` as notifications
    /// arrive.
    pub fn spawn(queue: OutboundQueue, publisher: Publisher<CollisionNotificationMessage>) -> Self {
        let worker_queue = queue.clone();
        let handle = std::thread::Builder::new()
            .name("copresence-sender".to_string())
            .spawn(move || {
                let mut batch = Vec::new();
                loop {
                    batch.clear();
                    if !worker_queue.drain_or_wait(&mut batch) {
                        break;
                    }
                    for message in batch.drain(..) {
                        publisher.put(message);
                    }
                }
            })
            .expect("failed to spawn sender thread");
        Self { queue, handle: Some(handle) }
    }

    pub fn queue(&self) -> &OutboundQueue {
        &self.queue
    }

    /// Set the shutdown flag and wake the sender; waits for it to exit.
    pub fn shut_down(mut self) {
        self.queue.shut_down();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Sender {
    fn drop(&mut self) {
        self.queue.shut_down();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
