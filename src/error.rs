//! Error types for the proxy-validator crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Reason a single proxy failed validation.
///
/// These never abort a run; the proxy is simply left out of the output.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The candidate is not a usable `host:port` authority.
    #[error("invalid proxy address {0}")]
    InvalidAddress(String),
    /// Connection-level failure or a terminal error response.
    #[error("network error: {0}")]
    Network(String),
    /// The endpoint kept answering with a rate-limit status until backoff gave up.
    #[error("gave up retrying, last status: {status}")]
    RetryExhausted { status: u16 },
    /// The final response was not `200 OK`.
    #[error("invalid status code: {0}")]
    BadStatus(u16),
    /// The body is not an echo response with at least one IP.
    #[error("malformed echo response: {0}")]
    MalformedResponse(String),
    /// The first reported IP is not a syntactically valid address.
    #[error("invalid IP: {0}")]
    InvalidReportedIp(String),
    /// The proxy forwards the caller's own IP.
    #[error("not anonymous proxy, origin: {origin}")]
    NotAnonymous { origin: String },
}

/// Error that aborts the whole validation run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("cannot raise open file limit: {0}")]
    ResourceLimit(String),
    #[error("failed to read candidates from {}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to resolve caller IP")]
    CallerIp(#[source] ValidationError),
    #[error("failed to write proxies to {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
