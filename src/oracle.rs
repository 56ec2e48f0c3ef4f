//! Resolution of the caller's own public IP.

use crate::config::ValidatorConfig;
use crate::echo::Origin;
use crate::error::ValidationError;

use log::info;
use reqwest::header::USER_AGENT;
use reqwest::Client;

/// Ask the echo endpoint, without any proxy, which IP we come from.
///
/// The result is the baseline every proxy is compared against.
pub async fn resolve_caller_ip(config: &ValidatorConfig) -> Result<String, ValidationError> {
    let client = Client::builder()
        .no_proxy()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ValidationError::Network(e.to_string()))?;

    let response = client
        .get(&config.echo_url)
        .header(USER_AGENT, &config.user_agent)
        .send()
        .await
        .map_err(|e| ValidationError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ValidationError::Network(format!(
            "echo endpoint answered {}",
            status
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ValidationError::Network(e.to_string()))?;
    let origin = Origin::from_json(&body)?;

    info!("Current IP: {}", origin.reported_ip());
    Ok(origin.reported_ip().to_string())
}
