//! Error types for history and reckoning operations.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the core containers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The operation requires at least one element.
    #[error("container is empty")]
    Empty,

    /// An index, count, or revision fell outside the valid bounds.
    /// Always a caller bug, never retried.
    #[error("{what} {value} out of range (retained {retained})")]
    OutOfRange {
        /// What kind of value was out of range.
        what: &'static str,
        /// The offending value.
        value: u64,
        /// How many elements were retained at the time.
        retained: u64,
    },

    /// A position was reported for an observer that was never
    /// registered. Caller bug.
    #[error("unknown observer")]
    UnknownObserver,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offender() {
        let err = CoreError::OutOfRange {
            what: "index",
            value: 9,
            retained: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("index"));
        assert!(msg.contains('9'));
        assert!(msg.contains('3'));
    }
}
