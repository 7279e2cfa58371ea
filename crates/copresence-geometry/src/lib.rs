//! `copresence-geometry` – the geometric kernel.
//!
//! Points, axis-aligned boxes, spheres, minimum-distance queries and the
//! thick-segment body representation used to decide whether two moving
//! bodies are close enough to matter.
//!
//! # Modules
//!
//! - [`point`] – [`Point`]: a 3-D coordinate (and displacement vector),
//!   plus [`point::centre`] and [`point::average`].
//! - [`bounds`] – [`Bounds`] and [`Sphere`]: axis-aligned and spherical
//!   bounding volumes, with [`bounds::hull`], [`bounds::hull_boxes`] and
//!   [`bounds::widen`].
//! - [`distance`] – [`distance::distance_point_point`],
//!   [`distance::distance_point_segment`],
//!   [`distance::distance_segment_segment`] and
//!   [`distance::geometric_median`].
//! - [`sample`] – [`BodySegmentSample`]: a thick segment with propagated
//!   uncertainty, the intersection and distance tests built on the above.
//! - [`error`] – [`GeometryError`].

pub mod bounds;
pub mod distance;
pub mod error;
pub mod point;
pub mod sample;

pub use bounds::{hull, hull_boxes, widen, Bounds, Sphere};
pub use distance::{distance_point_point, distance_point_segment, distance_segment_segment, geometric_median};
pub use error::GeometryError;
pub use point::{average, centre, Point};
pub use sample::BodySegmentSample;
