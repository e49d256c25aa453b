use url::{Host, Url};

use super::error::ProbeError;

#[derive(Debug, Clone)]
pub struct Target {
    pub url: Url,
}

impl Target {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn is_tls(&self) -> bool {
        self.scheme() == "https"
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Host in the form a socket or TLS server name expects (IPv6 without brackets).
    pub fn dial_host(&self) -> Result<String, ProbeError> {
        match self.url.host() {
            Some(Host::Domain(domain)) => Ok(domain.to_string()),
            Some(Host::Ipv4(addr)) => Ok(addr.to_string()),
            Some(Host::Ipv6(addr)) => Ok(addr.to_string()),
            None => Err(ProbeError::InvalidTarget(format!(
                "Target '{}' is missing a host",
                self.url
            ))),
        }
    }

    pub fn port(&self) -> Result<u16, ProbeError> {
        self.url.port_or_known_default().ok_or_else(|| {
            ProbeError::InvalidTarget(format!("Target '{}' has no known port", self.url))
        })
    }

    /// `host[:port]`, with the port only when it was given explicitly.
    pub fn authority(&self) -> Result<String, ProbeError> {
        let host = self.host().ok_or_else(|| {
            ProbeError::InvalidTarget(format!("Target '{}' is missing a host", self.url))
        })?;
        Ok(match self.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    pub fn path_only(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url.as_str())
    }
}
