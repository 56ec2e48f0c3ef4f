//! Classification of request outcomes and the retrying request entry point.

use crate::error::ValidationError;

use log::debug;
use reqwest::header::USER_AGENT;
use reqwest::{Method, Response, StatusCode};
use reqwest_middleware::ClientWithMiddleware;

/// What to do with the outcome of one request attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A response the caller should inspect (1xx, 2xx, 3xx).
    Accept,
    /// Rate limited or overloaded (status >= 429); worth retrying after a pause.
    RateLimited,
    /// Terminal client error (400..=428).
    Rejected,
    /// No HTTP response at all: refused, timed out, DNS failure.
    ConnectionFailed,
}

/// Classify one attempt. `None` means the request produced no response.
pub fn classify(status: Option<StatusCode>) -> Outcome {
    match status {
        None => Outcome::ConnectionFailed,
        Some(status) if status.as_u16() >= StatusCode::TOO_MANY_REQUESTS.as_u16() => {
            Outcome::RateLimited
        }
        Some(status) if status.as_u16() >= StatusCode::BAD_REQUEST.as_u16() => Outcome::Rejected,
        Some(_) => Outcome::Accept,
    }
}

/// Send `method url` through `client` with the given User-Agent.
///
/// The client is expected to carry [`RateLimitRetry`](crate::middleware::RateLimitRetry),
/// so a rate-limited response seen here means backoff already gave up.
pub async fn request_with_retry(
    client: &ClientWithMiddleware,
    method: Method,
    url: &str,
    user_agent: &str,
) -> Result<Response, ValidationError> {
    let result = client
        .request(method, url)
        .header(USER_AGENT, user_agent)
        .send()
        .await;

    let status = result.as_ref().ok().map(Response::status);
    match (classify(status), result) {
        (Outcome::Accept, Ok(response)) => Ok(response),
        (Outcome::RateLimited, Ok(response)) => Err(ValidationError::RetryExhausted {
            status: response.status().as_u16(),
        }),
        (Outcome::Rejected, Ok(response)) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ValidationError::Network(format!(
                "error response {}: {}",
                status,
                body.trim()
            )))
        }
        (Outcome::ConnectionFailed, Err(err)) => {
            debug!("{} failed without a response: {}", url, err);
            Err(ValidationError::Network(err.to_string()))
        }
        // classify(None) is the only source of ConnectionFailed.
        (outcome, _) => Err(ValidationError::Network(format!(
            "inconsistent outcome {:?} for {}",
            outcome, url
        ))),
    }
}
