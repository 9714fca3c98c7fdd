//! Error types for the pet service client.
//!
//! # Design
//! Only failures to complete a round trip are errors. Any status the service
//! answers with, 4xx and 5xx included, is a normal `ApiResult` so callers can
//! assert on expected failure statuses directly.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to complete a request/response round trip.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The service could not be reached (DNS, connect, reset, read error).
    #[error("network failure: {0}")]
    Network(#[source] reqwest::Error),

    /// The configured per-call timeout expired.
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The request could not be built, e.g. a header value that is not
    /// valid on the wire or a malformed base URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A file part's local path could not be opened or read.
    #[error("cannot read file part {}: {source}", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err)
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Network(err)
        }
    }
}
