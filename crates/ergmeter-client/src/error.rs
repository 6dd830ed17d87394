//! Client error types.

use thiserror::Error;

/// Errors constructing the client. Runtime fetch failures are not errors;
/// they surface as absent fields in the returned reading.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
