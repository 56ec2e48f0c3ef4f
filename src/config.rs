//! Configuration for the proxy validator.

use crate::backoff::BackoffPolicy;
use crate::error::PipelineError;

use std::path::PathBuf;
use std::time::Duration;

/// Endpoint that echoes the caller's apparent IP as `{"origin": "..."}`.
pub const DEFAULT_ECHO_URL: &str = "http://httpbin.org/ip";

/// Desktop browser User-Agent sent with every test request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.81 Safari/537.36";

/// Maximum number of proxy tests in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// File the validated proxies are written to.
pub const DEFAULT_OUTPUT_PATH: &str = "proxies.txt";

/// Configuration for a validation run.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// URL of the echo endpoint, queried directly and through every proxy.
    pub echo_url: String,
    /// User-Agent header sent with test requests.
    pub user_agent: String,
    /// Timeout applied to every single request attempt.
    pub request_timeout: Duration,
    /// Maximum number of concurrent proxy tests.
    pub concurrency: usize,
    /// Where validated proxies are written.
    pub output_path: PathBuf,
    /// Backoff used when the echo endpoint answers with a rate-limit status.
    pub backoff: BackoffPolicy,
}

impl ValidatorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::new()
    }

    /// Check the settings that would otherwise fail deep inside a run.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.concurrency == 0 {
            return Err(PipelineError::Config("concurrency must be at least 1".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(PipelineError::Config("request timeout must be non-zero".into()));
        }
        let url = url::Url::parse(&self.echo_url).map_err(|e| {
            PipelineError::Config(format!("invalid echo url {}: {}", self.echo_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(PipelineError::Config(format!(
                "echo url must be an absolute http(s) url: {}",
                self.echo_url
            )));
        }
        Ok(())
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfigBuilder::new().build()
    }
}

/// Builder for `ValidatorConfig`.
pub struct ValidatorConfigBuilder {
    echo_url: Option<String>,
    user_agent: Option<String>,
    request_timeout: Option<Duration>,
    concurrency: Option<usize>,
    output_path: Option<PathBuf>,
    backoff: Option<BackoffPolicy>,
}

impl ValidatorConfigBuilder {
    /// Create a new builder with default values.
    pub fn new() -> Self {
        Self {
            echo_url: None,
            user_agent: None,
            request_timeout: None,
            concurrency: None,
            output_path: None,
            backoff: None,
        }
    }

    /// Set the echo endpoint URL.
    pub fn echo_url(mut self, url: impl Into<String>) -> Self {
        self.echo_url = Some(url.into());
        self
    }

    /// Set the User-Agent sent with test requests.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the per-attempt request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the maximum number of concurrent proxy tests.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Set the output file path.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set the backoff policy for rate-limited requests.
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ValidatorConfig {
        ValidatorConfig {
            echo_url: self.echo_url.unwrap_or_else(|| DEFAULT_ECHO_URL.to_string()),
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            request_timeout: self.request_timeout.unwrap_or(Duration::from_secs(60)),
            concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            output_path: self.output_path.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            backoff: self.backoff.unwrap_or_default(),
        }
    }
}

impl Default for ValidatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
