//! Port numbers and port-list parsing.
//!
//! `Port` guarantees a value in 1-65535. `PortSpec` parses the textual
//! form accepted on the command line ("80", "80,443", "1-1024",
//! "22,80,8000-8100") into a sorted, deduplicated port list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A validated TCP port number (1-65535).
///
/// Port 0 is not a scannable port, so the newtype rules it out at
/// construction time instead of checking at every use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Lowest valid port number.
    pub const MIN: u16 = 1;
    /// Highest valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new `Port`, returning `None` for port 0.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value as u32))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: {0}")]
    InvalidRange(String),
    #[error("empty port specification")]
    Empty,
}

/// A parsed port specification.
///
/// Holds the expanded, deduplicated set of ports in ascending order.
/// Duplicate entries in the input ("80,80,443") collapse to one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortSpec {
    ports: Vec<Port>,
}

impl PortSpec {
    /// All ports in ascending order.
    pub fn to_ports(&self) -> Vec<Port> {
        self.ports.clone()
    }

    /// Number of unique ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Check if the specification contains no ports.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let mut set = BTreeSet::new();

        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((lo, hi)) = part.split_once('-') {
                let start = parse_port_number(lo)?;
                let end = parse_port_number(hi)?;
                if start > end {
                    return Err(PortError::InvalidRange(part.to_string()));
                }
                for p in start.as_u16()..=end.as_u16() {
                    set.insert(Port(p));
                }
            } else {
                set.insert(parse_port_number(part)?);
            }
        }

        if set.is_empty() {
            return Err(PortError::Empty);
        }

        Ok(Self {
            ports: set.into_iter().collect(),
        })
    }
}

fn parse_port_number(s: &str) -> Result<Port, PortError> {
    let s = s.trim();
    let n: u32 = s
        .parse()
        .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
    if n > Port::MAX as u32 {
        return Err(PortError::OutOfRange(n));
    }
    Port::new(n as u16).ok_or(PortError::OutOfRange(n))
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Re-collapse consecutive runs back into range notation.
        let mut parts: Vec<String> = Vec::new();
        let mut i = 0;
        while i < self.ports.len() {
            let start = self.ports[i].as_u16();
            let mut end = start;
            while i + 1 < self.ports.len() && self.ports[i + 1].as_u16() == end + 1 {
                i += 1;
                end = self.ports[i].as_u16();
            }
            if start == end {
                parts.push(start.to_string());
            } else {
                parts.push(format!("{}-{}", start, end));
            }
            i += 1;
        }
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(80).is_some());
        assert!(Port::new(65535).is_some());
    }

    #[test]
    fn test_spec_single_and_list() {
        let spec: PortSpec = "80".parse().unwrap();
        assert_eq!(spec.len(), 1);

        let spec: PortSpec = "22, 80,443".parse().unwrap();
        assert_eq!(spec.len(), 3);
        assert_eq!(spec.to_ports()[0].as_u16(), 22);
    }

    #[test]
    fn test_spec_ranges() {
        let spec: PortSpec = "1-1024".parse().unwrap();
        assert_eq!(spec.len(), 1024);

        let spec: PortSpec = "22,80,443,8000-8010".parse().unwrap();
        assert_eq!(spec.len(), 14);
    }

    #[test]
    fn test_spec_dedup_and_order() {
        let spec: PortSpec = "443,80,80,443,80".parse().unwrap();
        let ports = spec.to_ports();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].as_u16(), 80);
        assert_eq!(ports[1].as_u16(), 443);
    }

    #[test]
    fn test_spec_rejects_malformed() {
        assert!("".parse::<PortSpec>().is_err());
        assert!("abc".parse::<PortSpec>().is_err());
        assert!("0".parse::<PortSpec>().is_err());
        assert!("70000".parse::<PortSpec>().is_err());
        assert!("100-1".parse::<PortSpec>().is_err());
        assert!("1-2-3".parse::<PortSpec>().is_err());
    }

    #[test]
    fn test_spec_display_roundtrip() {
        let spec: PortSpec = "22,80,443,8000-8003".parse().unwrap();
        assert_eq!(spec.to_string(), "22,80,443,8000-8003");
    }
}
