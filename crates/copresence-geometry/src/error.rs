use thiserror::Error;

/// Failure modes of the geometric kernel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// An operation that requires at least one point was given none.
    #[error("geometric operation requires a non-empty point set")]
    EmptyInput,
    /// Weiszfeld iteration did not converge within its iteration cap.
    #[error("geometric median did not converge within {0} iterations")]
    MedianDidNotConverge(usize),
}
