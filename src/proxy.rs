//! Candidate proxy addresses.

use crate::error::ValidationError;

use std::fmt;
use url::Url;

/// A parsed `host:port` HTTP proxy authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAddress {
    /// The candidate line as read from the input.
    pub candidate: String,
    /// `http://host:port`, the form reqwest expects.
    pub url: Url,
}

impl ProxyAddress {
    /// Parse a `host:port` candidate. IPv6 hosts must be bracketed.
    pub fn parse(candidate: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAddress(candidate.to_string());

        let (host, port) = candidate.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty()
            || host.contains('@')
            || host.contains('/')
            || host.contains(char::REPLACEMENT_CHARACTER)
        {
            return Err(invalid());
        }
        match port.parse::<u16>() {
            Ok(port) if port != 0 => {}
            _ => return Err(invalid()),
        }

        let url = Url::parse(&format!("http://{}", candidate)).map_err(|_| invalid())?;
        if url.host_str().is_none()
            || url.path() != "/"
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return Err(invalid());
        }

        Ok(Self {
            candidate: candidate.to_string(),
            url,
        })
    }

    /// Convert into a reqwest proxy that carries every request, http or https.
    pub fn to_reqwest_proxy(&self) -> Result<reqwest::Proxy, ValidationError> {
        reqwest::Proxy::all(self.url.as_str())
            .map_err(|_| ValidationError::InvalidAddress(self.candidate.clone()))
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.candidate)
    }
}
