use thiserror::Error;

/// Failure modes of mode and mode-trace operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModeError {
    /// Two modes were compared for equality but their key sets differ.
    #[error("cannot compare modes with different key sets")]
    KeySetMismatch,
    /// `reduce_between`/`forward_index`/`backward_index` referenced a mode
    /// absent from the trace.
    #[error("mode not present in trace")]
    ModeNotInTrace,
    /// `reduce_between(a, b)` where the first occurrence of `a` comes after
    /// the last occurrence of `b`.
    #[error("start mode occurs after end mode in trace")]
    UnorderedRange,
}
