//! `copresence-types` – the shared data model.
//!
//! Body definitions, the four wire messages the runtime exchanges, and the
//! error taxonomy every other crate in the workspace wraps.
//!
//! # Modules
//!
//! - [`body`] – [`Body`], [`BodyIdentity`], [`BodySegment`], [`Timestamp`],
//!   [`Interval`].
//! - [`messages`] – [`BodyPresentationMessage`], [`HumanStateMessage`],
//!   [`RobotStateMessage`], [`CollisionNotificationMessage`].
//! - [`error`] – [`CoreError`].

pub mod body;
pub mod error;
pub mod messages;

pub use body::{default_human_presentation, Body, BodyIdentity, BodySegment, Interval, Timestamp};
pub use error::CoreError;
pub use messages::{BodyPresentationMessage, CollisionNotificationMessage, HumanStateMessage, RobotStateMessage, SegmentPointSample};
