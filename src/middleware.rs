//! Middleware that retries rate-limited requests with exponential backoff.

use crate::backoff::BackoffPolicy;
use crate::retry::{classify, Outcome};

use anyhow::anyhow;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest_middleware::{Error, Middleware, Next, Result};

/// Re-issues a request while the response is in the rate-limit class.
///
/// Only [`Outcome::RateLimited`] is retried. Connection errors and every
/// other status are handed back after the first attempt. Once the backoff
/// gives up, the last rate-limited response is returned as is.
#[derive(Debug, Clone)]
pub struct RateLimitRetry {
    policy: BackoffPolicy,
}

impl RateLimitRetry {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Middleware for RateLimitRetry {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> Result<reqwest::Response> {
        let mut backoff = self.policy.start();
        let mut attempt = 1;

        loop {
            let attempt_req = req.try_clone().ok_or_else(|| {
                Error::Middleware(anyhow!(
                    "Request object is not cloneable. Are you passing a streaming body?"
                ))
            })?;

            let response = next.clone().run(attempt_req, extensions).await?;
            let status = response.status();

            if classify(Some(status)) != Outcome::RateLimited {
                return Ok(response);
            }

            match backoff.next_backoff() {
                Some(delay) => {
                    debug!(
                        "{} answered {} (attempt {}), retrying in {:?}",
                        req.url(),
                        status,
                        attempt,
                        delay
                    );
                    drop(response);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    warn!(
                        "{} still answering {} after {} attempts, giving up",
                        req.url(),
                        status,
                        attempt
                    );
                    return Ok(response);
                }
            }
        }
    }
}
