//! Headless, typed, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the others. A [`Bus<T>`] multiplexes any number of topics, each backed
//! by its own channel, created lazily on first use.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Default channel capacity (number of buffered messages before old ones
/// are dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// A topic-multiplexed broadcast bus for one message type.
///
/// Clone it cheaply via [`std::sync::Arc`] — every topic's channel is
/// shared by all clones.
pub struct Bus<T> {
    capacity: usize,
    channels: Mutex<HashMap<String, broadcast::Sender<T>>>,
}

impl<T: Clone + Send + 'static> Bus<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity, channels: Mutex::new(HashMap::new()) }
    }

    fn sender_for(&self, topic: &str) -> broadcast::Sender<T> {
        let mut channels = self.channels.lock().expect("bus mutex poisoned");
        channels.entry(topic.to_string()).or_insert_with(|| broadcast::channel(self.capacity).0).clone()
    }

    /// Publish `message` on `topic`. Silently drops the message if `topic`
    /// has no active subscriber — a bus with nothing listening is not an
    /// error condition.
    pub fn publish(&self, topic: &str, message: T) {
        let _ = self.sender_for(topic).send(message);
    }

    /// Spawn a task that invokes `callback` once per message received on
    /// `topic`, until the returned [`SubscriberHandle`] is dropped.
    pub fn subscribe(&self, topic: impl Into<String>, callback: impl Fn(T) + Send + 'static) -> SubscriberHandle {
        let mut receiver = self.sender_for(&topic.into()).subscribe();
        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => callback(message),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "subscriber lagged, dropping buffered messages");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        SubscriberHandle { task }
    }
}

impl<T: Clone + Send + 'static> Default for Bus<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns a subscription's background task. Dropping it tears the
/// subscription down — no in-flight callback invocation is aborted, but no
/// further messages are delivered afterward.
pub struct SubscriberHandle {
    task: JoinHandle<()>,
}

impl Drop for SubscriberHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A handle to publish messages of type `T` on a fixed topic.
#[derive(Clone)]
pub struct Publisher<T> {
    bus: std::sync::Arc<Bus<T>>,
    topic: String,
}

impl<T: Clone + Send + 'static> Publisher<T> {
    pub fn new(bus: std::sync::Arc<Bus<T>>, topic: impl Into<String>) -> Self {
        Self { bus, topic: topic.into() }
    }

    pub fn put(&self, message: T) {
        self.bus.publish(&self.topic, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    #[tokio::test]
    async fn subscriber_receives_published_messages() {
        let bus: Bus<u32> = Bus::new();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let received_clone = received.clone();
        let _sub = bus.subscribe("numbers", move |n| received_clone.lock().unwrap().push(n));

        bus.publish("numbers", 1);
        bus.publish("numbers", 2);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*received.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let bus: Bus<&'static str> = Bus::new();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let received_clone = received.clone();
        let _sub = bus.subscribe("a", move |m| received_clone.lock().unwrap().push(m));

        bus.publish("b", "should not arrive");
        bus.publish("a", "should arrive");
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*received.lock().unwrap(), vec!["should arrive"]);
    }

    #[tokio::test]
    async fn dropping_handle_stops_delivery() {
        let bus: Bus<u32> = Bus::new();
        let received = Arc::new(StdMutex::new(Vec::new()));
        let received_clone = received.clone();
        let sub = bus.subscribe("numbers", move |n| received_clone.lock().unwrap().push(n));
        drop(sub);
        tokio::time::sleep(Duration::from_millis(10)).await;

        bus.publish("numbers", 42);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let bus: Bus<u32> = Bus::new();
        bus.publish("nobody-listening", 1);
    }

    #[tokio::test]
    async fn publisher_puts_onto_its_bus_topic() {
        let bus = Arc::new(Bus::<u32>::new());
        let received = Arc::new(StdMutex::new(Vec::new()));
        let received_clone = received.clone();
        let _sub = bus.subscribe("events", move |n| received_clone.lock().unwrap().push(n));

        let publisher = Publisher::new(bus, "events");
        publisher.put(7);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*received.lock().unwrap(), vec![7]);
    }
}
