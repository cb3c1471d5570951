//! Signals raised across the producer and consumer contracts.

use thiserror::Error;

/// Result type alias for sequencing operations
pub type Result<T> = std::result::Result<T, DisruptorError>;

/// Every capacity, alert and timeout condition surfaces as one of these variants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisruptorError {
    /// A non-blocking claim found too few free slots. Nothing was claimed.
    #[error("insufficient capacity in ring buffer")]
    InsufficientCapacity,

    /// The barrier was alerted; used for cooperative shutdown of consumers.
    #[error("sequence barrier alerted")]
    Alert,

    /// A bounded wait strategy gave up before the sequence became available.
    #[error("timed out waiting for sequence")]
    Timeout,

    /// The caller misused the API (claim size below one, bad buffer size).
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument
        message: String,
    },
}

impl DisruptorError {
    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether retrying the same call later can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientCapacity | Self::Timeout)
    }
}
