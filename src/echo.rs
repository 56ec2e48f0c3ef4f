//! Decoding of the echo endpoint's `{"origin": "..."}` body.

use crate::error::ValidationError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct EchoResponse {
    origin: String,
}

/// Origin reported by the echo endpoint.
///
/// A forwarding proxy may produce a comma separated list such as
/// `"198.51.100.4, 203.0.113.7"`. Only the first entry is the reported IP;
/// the full string is kept for the anonymity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    raw: String,
    reported: String,
}

impl Origin {
    /// Decode a JSON echo response body.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        let echo: EchoResponse = serde_json::from_slice(body)
            .map_err(|e| ValidationError::MalformedResponse(e.to_string()))?;
        Self::parse(echo.origin)
    }

    /// Split a raw origin string; fails when it holds no IP token.
    pub fn parse(raw: String) -> Result<Self, ValidationError> {
        let reported = raw.split(',').next().unwrap_or_default().trim().to_string();
        if reported.is_empty() {
            return Err(ValidationError::MalformedResponse(format!("no IPs found: {:?}", raw)));
        }
        Ok(Self { raw, reported })
    }

    /// First IP of the origin list.
    pub fn reported_ip(&self) -> &str {
        &self.reported
    }

    /// The origin exactly as the endpoint sent it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether `ip` shows up anywhere in the origin string.
    pub fn reveals(&self, ip: &str) -> bool {
        self.raw.contains(ip)
    }
}
