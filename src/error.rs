//! Typed errors for upstream fetches.
//!
//! Every external source is expected to fail sometimes. Fetch errors are
//! caught at each snapshot-builder boundary and converted into a well-formed
//! "unavailable" placeholder, so they carry enough detail to log but are
//! never allowed to abort a run.

use thiserror::Error;

/// Failure of a single upstream fetch or of parsing its payload.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure, including timeouts.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    /// The upstream answered, but the payload was not in the expected shape.
    #[error("malformed payload: {0}")]
    Payload(String),
}
