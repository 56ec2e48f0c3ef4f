//! # proxy-validator
//!
//! Concurrent checker for HTTP proxy lists.
//!
//! Every candidate proxy is used to fetch an IP echo endpoint. A proxy passes
//! when the request succeeds, reports a valid IP and does not leak the
//! caller's own IP. Rate-limited responses are retried with exponential
//! backoff; at most a fixed number of proxies are tested at once.

pub mod backoff;
pub mod config;
pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod limits;
pub mod middleware;
pub mod oracle;
pub mod pipeline;
pub mod proxy;
pub mod retry;
pub mod tester;
pub mod utils;

pub use backoff::BackoffPolicy;
pub use config::{ValidatorConfig, ValidatorConfigBuilder};
pub use dispatcher::{Dispatcher, ResultSet};
pub use error::{PipelineError, ValidationError};
pub use middleware::RateLimitRetry;
pub use oracle::resolve_caller_ip;
pub use pipeline::{Pipeline, Summary};
pub use proxy::ProxyAddress;
pub use retry::{classify, request_with_retry, Outcome};
pub use tester::{Probe, ProxyTester};
