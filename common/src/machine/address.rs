//! # Machine Addresses
//!
//! An address is either an IP literal or a hostname. Parsing happens during
//! validation; everything past the validator can assume the address is
//! well-formed.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Where a machine's probe should point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostAddress {
    /// A literal IPv4 or IPv6 address.
    Ip(IpAddr),
    /// An RFC-1123-shaped hostname.
    Hostname(String),
}

impl FromStr for HostAddress {
    type Err = String;

    /// Parses an address string.
    ///
    /// Tries an IP literal first (e.g. "10.0.0.1", "::1"), then falls back
    /// to hostname syntax (e.g. "db-01.internal").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("address cannot be empty".to_string());
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Ip(ip));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(format!("invalid address: {s}"))
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(ip) => ip.fmt(f),
            Self::Hostname(name) => f.write_str(name),
        }
    }
}

/// RFC-1123 shape: dot-separated labels of up to 63 alphanumeric/hyphen
/// characters, no leading or trailing hyphen, at most 253 total.
fn is_valid_hostname(s: &str) -> bool {
    if s.len() > 253 {
        return false;
    }
    s.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    if label.is_empty() || label.len() > 63 {
        return false;
    }
    if label.starts_with('-') || label.ends_with('-') {
        return false;
    }
    label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
