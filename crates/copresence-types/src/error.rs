use thiserror::Error;

use copresence_geometry::GeometryError;
use copresence_mode::ModeError;

/// The shared error taxonomy used across the collision-prediction core.
///
/// Each variant names a class of failure rather than a single call site;
/// crates that need a narrower surface wrap this type instead of minting
/// their own.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A caller-enforced precondition was violated: an out-of-order
    /// timestamp, an unknown-timestamp lookup, a mode comparison across
    /// differing key sets, a geometric median over an empty point set, or a
    /// `reduce_between` over absent or out-of-order modes. Surfaced to the
    /// caller; never retried.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
    /// Weiszfeld iteration failed to converge within its cap.
    #[error("numeric method did not converge within {0} iterations")]
    NumericNonConvergence(usize),
    /// A state message referenced a robot id absent from the registry.
    #[error("registry has no entry for id {0}")]
    RegistryMiss(String),
    /// A message failed to parse at the wire-codec boundary.
    #[error("failed to parse message: {0}")]
    ParseError(String),
}

impl From<GeometryError> for CoreError {
    fn from(err: GeometryError) -> Self {
        match err {
            GeometryError::EmptyInput => CoreError::PreconditionViolation(err.to_string()),
            GeometryError::MedianDidNotConverge(n) => CoreError::NumericNonConvergence(n),
        }
    }
}

impl From<ModeError> for CoreError {
    fn from(err: ModeError) -> Self {
        CoreError::PreconditionViolation(err.to_string())
    }
}
