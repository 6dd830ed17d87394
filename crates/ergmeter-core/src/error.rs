//! Error types for ergmeter-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Poll interval out of range: {0} minutes (valid: 5..=1440)")]
    IntervalOutOfRange(u64),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
