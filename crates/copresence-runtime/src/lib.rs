//! `copresence-runtime` – the message-driven dispatcher.
//!
//! Wires the history, geometry and barrier crates to a [`BrokerAccess`] so
//! that presentation, human-state and robot-state messages become
//! collision-notification publications.
//!
//! # Modules
//!
//! - [`registry`] – [`BodyRegistry`][registry::BodyRegistry]: every known
//!   body and its observation history.
//! - [`pending`] – [`PendingPairs`][pending::PendingPairs]: (human, robot)
//!   pairs awaiting job promotion.
//! - [`job`] – [`LookAheadJob`][job::LookAheadJob] and [`JobFactory`][job::JobFactory]:
//!   the per-segment-pair collision walk and the seam a concrete policy
//!   plugs into.
//! - [`queue`] – [`JobQueue`][queue::JobQueue]: the synchronised waiting and
//!   sleeping job queues.
//! - [`outbound`] – [`OutboundQueue`][outbound::OutboundQueue] and
//!   [`Sender`][outbound::Sender]: the condition-variable-driven hop to the
//!   collision-notification publisher.
//! - [`dispatcher`] – [`Dispatcher`][dispatcher::Dispatcher]: the registry
//!   mutex critical section run on every incoming state message. Each
//!   subscriber callback is a `tracing` span; [`Dispatcher::bootstrap`]
//!   is the startup path that wires those spans to a live subscriber.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber with an optional OTLP span exporter.
//!   Called once, from [`Dispatcher::bootstrap`][dispatcher::Dispatcher::bootstrap].

pub mod dispatcher;
pub mod job;
pub mod outbound;
pub mod pending;
pub mod queue;
pub mod registry;
pub mod telemetry;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use job::{DefaultJobFactory, JobAwakeningResult, JobFactory, JobId, LookAheadJob};
pub use outbound::{OutboundQueue, Sender};
pub use pending::PendingPairs;
pub use queue::JobQueue;
pub use registry::BodyRegistry;
pub use telemetry::{init_tracing, TracerProviderGuard};
