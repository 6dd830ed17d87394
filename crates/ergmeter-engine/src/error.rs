//! Engine error types.

use thiserror::Error;

/// Errors an update cycle can surface.
///
/// Fetch and parse failures never reach this type; the only thing a cycle
/// refuses to swallow is a broken state store, since silently losing a day
/// baseline would corrupt every later computation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("State store error: {0}")]
    Store(#[from] ergmeter_store::StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
