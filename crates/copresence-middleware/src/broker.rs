//! [`BrokerAccess`]: the runtime's one door onto the message bus.
//!
//! The runtime dispatcher never touches [`crate::bus::Bus`] directly; it
//! asks a `BrokerAccess` for a subscriber or a publisher and only ever
//! sees the four message types it cares about.

use std::sync::Arc;

use copresence_types::{BodyPresentationMessage, CollisionNotificationMessage, HumanStateMessage, RobotStateMessage};

use crate::bus::{Bus, Publisher, SubscriberHandle};

/// Factory surface the runtime dispatcher is built against.
///
/// Each `make_*_subscriber` call registers `callback` to run once per
/// message published on `topic`, for as long as the returned
/// [`SubscriberHandle`] is kept alive. `make_collision_notification_publisher`
/// returns a handle whose [`Publisher::put`] enqueues onto that topic.
#[derive(Clone, Default)]
pub struct BrokerAccess {
    body_presentation: Arc<Bus<BodyPresentationMessage>>,
    human_state: Arc<Bus<HumanStateMessage>>,
    robot_state: Arc<Bus<RobotStateMessage>>,
    collision_notification: Arc<Bus<CollisionNotificationMessage>>,
}

impl BrokerAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_body_presentation_subscriber(
        &self,
        topic: impl Into<String>,
        callback: impl Fn(BodyPresentationMessage) + Send + 'static,
    ) -> SubscriberHandle {
        self.body_presentation.subscribe(topic, callback)
    }

    pub fn make_human_state_subscriber(&self, topic: impl Into<String>, callback: impl Fn(HumanStateMessage) + Send + 'static) -> SubscriberHandle {
        self.human_state.subscribe(topic, callback)
    }

    pub fn make_robot_state_subscriber(&self, topic: impl Into<String>, callback: impl Fn(RobotStateMessage) + Send + 'static) -> SubscriberHandle {
        self.robot_state.subscribe(topic, callback)
    }

    pub fn make_collision_notification_publisher(&self, topic: impl Into<String>) -> Publisher<CollisionNotificationMessage> {
        Publisher::new(self.collision_notification.clone(), topic)
    }
}
