use thiserror::Error;

/// Failure modes of the history engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// `acquire` was called with a timestamp not strictly greater than the
    /// history's current latest.
    #[error("timestamp {0} does not exceed the history's latest")]
    OutOfOrderTimestamp(u64),
    /// A lookup (`instance_number`, `latest_within`, `samples`, …) found no
    /// match for the given timestamp or mode.
    #[error("no match for the given lookup")]
    NoMatch,
}
