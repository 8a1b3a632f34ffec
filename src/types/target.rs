//! Scan target parsing and resolution.
//!
//! A target is either a literal IP address or a hostname that gets
//! resolved through the system's DNS configuration before scanning.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A target that has been resolved to a concrete IP address.
///
/// Keeps the original input string so results can be reported against
/// what the user typed rather than the resolved address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve '{0}': {1}")]
    ResolutionFailed(String, String),
    #[error("no addresses found for '{0}'")]
    NoAddresses(String),
}

/// An unresolved target specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// A literal IP address.
    Ip(IpAddr),
    /// A hostname to be resolved.
    Hostname(String),
}

impl TargetSpec {
    /// Parse a single target from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::InvalidFormat(s.to_string()));
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Ip(ip));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Resolve to a concrete [`ScanTarget`].
    ///
    /// Hostnames go through the system resolver; the first returned
    /// address wins.
    pub async fn resolve(&self) -> Result<ScanTarget, TargetError> {
        match self {
            Self::Ip(ip) => Ok(ScanTarget::new(ip.to_string(), *ip)),
            Self::Hostname(hostname) => {
                let resolver =
                    TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

                let response = resolver.lookup_ip(hostname.as_str()).await.map_err(|e| {
                    TargetError::ResolutionFailed(hostname.clone(), e.to_string())
                })?;

                let ip = response
                    .iter()
                    .next()
                    .ok_or_else(|| TargetError::NoAddresses(hostname.clone()))?;

                Ok(ScanTarget::new(hostname.clone(), ip))
            }
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => write!(f, "{}", ip),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// Check if a string is a plausible hostname (RFC 1123 labels).
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[test]
    fn test_parse_ipv4() {
        let spec = TargetSpec::parse("192.168.1.1").unwrap();
        assert!(matches!(spec, TargetSpec::Ip(IpAddr::V4(_))));
    }

    #[test]
    fn test_parse_ipv6() {
        let spec = TargetSpec::parse("::1").unwrap();
        assert!(matches!(spec, TargetSpec::Ip(IpAddr::V6(_))));
    }

    #[test]
    fn test_parse_hostname() {
        let spec = TargetSpec::parse("example.com").unwrap();
        assert_eq!(spec, TargetSpec::Hostname("example.com".to_string()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TargetSpec::parse("").is_err());
        assert!(TargetSpec::parse("-bad.example").is_err());
        assert!(TargetSpec::parse("host name").is_err());
    }

    #[tokio::test]
    async fn test_resolve_literal_ip_skips_dns() {
        let spec = TargetSpec::parse("127.0.0.1").unwrap();
        let target = assert_ok!(spec.resolve().await);
        assert_eq!(target.ip, "127.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(target.original, "127.0.0.1");
    }

    #[test]
    fn test_display_shows_original_and_ip() {
        let target = ScanTarget::new("example.com", "93.184.216.34".parse().unwrap());
        assert_eq!(target.to_string(), "example.com (93.184.216.34)");

        let target = ScanTarget::new("127.0.0.1", "127.0.0.1".parse().unwrap());
        assert_eq!(target.to_string(), "127.0.0.1");
    }
}
