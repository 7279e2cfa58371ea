//! `copresence-mode` – discrete robot state and its trace over time.
//!
//! # Modules
//!
//! - [`mode`] – [`Mode`]: a labelled robot state, a mapping from string keys
//!   to string values.
//! - [`mode_trace`] – [`ModeTrace`]: an ordered sequence of modes with
//!   per-entry likelihoods, supporting loop detection, range reduction,
//!   [`mode_trace::merge`] and [`ModeTrace::next_modes`] pattern prediction.
//! - [`error`] – [`ModeError`].

pub mod error;
pub mod mode;
pub mod mode_trace;

pub use error::ModeError;
pub use mode::Mode;
pub use mode_trace::{merge, ModeTrace, ModeTraceEntry};
