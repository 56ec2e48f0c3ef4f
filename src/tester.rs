//! Validation of a single proxy against the echo endpoint.

use crate::config::ValidatorConfig;
use crate::echo::Origin;
use crate::error::ValidationError;
use crate::middleware::RateLimitRetry;
use crate::proxy::ProxyAddress;
use crate::retry;

use async_trait::async_trait;
use log::debug;
use reqwest::{Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::net::IpAddr;
use std::sync::Arc;

/// Something that can decide whether one candidate proxy is usable.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn probe(&self, candidate: &str) -> Result<(), ValidationError>;
}

/// Tests proxies by fetching the echo endpoint through them.
#[derive(Clone)]
pub struct ProxyTester {
    config: Arc<ValidatorConfig>,
    caller_ip: Arc<str>,
}

impl ProxyTester {
    /// `caller_ip` is the baseline from [`resolve_caller_ip`](crate::oracle::resolve_caller_ip).
    pub fn new(config: Arc<ValidatorConfig>, caller_ip: impl Into<Arc<str>>) -> Self {
        Self {
            config,
            caller_ip: caller_ip.into(),
        }
    }

    pub fn caller_ip(&self) -> &str {
        &self.caller_ip
    }

    /// Run the full check for one `host:port` candidate.
    pub async fn test(&self, candidate: &str) -> Result<(), ValidationError> {
        let address = ProxyAddress::parse(candidate)?;
        let client = self.create_client(&address)?;

        let response = retry::request_with_retry(
            &client,
            Method::GET,
            &self.config.echo_url,
            &self.config.user_agent,
        )
        .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ValidationError::BadStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ValidationError::Network(e.to_string()))?;
        let origin = Origin::from_json(&body)?;
        debug!("{} reports origin {:?}", address, origin.raw());

        if origin.reported_ip().parse::<IpAddr>().is_err() {
            return Err(ValidationError::InvalidReportedIp(
                origin.reported_ip().to_string(),
            ));
        }
        if origin.reveals(&self.caller_ip) {
            return Err(ValidationError::NotAnonymous {
                origin: origin.raw().to_string(),
            });
        }

        Ok(())
    }

    /// Build a client that sends everything through `address`.
    fn create_client(&self, address: &ProxyAddress) -> Result<ClientWithMiddleware, ValidationError> {
        let client = reqwest::Client::builder()
            .proxy(address.to_reqwest_proxy()?)
            .timeout(self.config.request_timeout)
            .build()
            .map_err(|e| ValidationError::Network(e.to_string()))?;

        Ok(ClientBuilder::new(client)
            .with(RateLimitRetry::new(self.config.backoff))
            .build())
    }
}

#[async_trait]
impl Probe for ProxyTester {
    async fn probe(&self, candidate: &str) -> Result<(), ValidationError> {
        self.test(candidate).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_candidate_fails_before_any_request() {
        let tester = ProxyTester::new(Arc::new(ValidatorConfig::default()), "203.0.113.7");
        let result = tester.test("not-a-proxy").await;
        assert!(matches!(result, Err(ValidationError::InvalidAddress(c)) if c == "not-a-proxy"));
    }
}
