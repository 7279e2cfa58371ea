//! `copresence-middleware` – the broker abstraction.
//!
//! Routes the four wire messages between a concrete transport and the
//! runtime dispatcher without the dispatcher ever needing to know what
//! that transport is.
//!
//! # Modules
//!
//! - [`bus`] – [`Bus`][bus::Bus]: a headless, topic-multiplexed
//!   publish/subscribe channel built on Tokio broadcast channels.
//! - [`broker`] – [`BrokerAccess`]: the four-message-type factory surface
//!   the dispatcher is built against.

pub mod broker;
pub mod bus;

pub use broker::BrokerAccess;
pub use bus::{Bus, Publisher, SubscriberHandle};
