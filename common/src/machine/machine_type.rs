//! # Machine Type Tags
//!
//! A `MachineType` selects the probe strategy for a machine. The collection
//! of well-known tags below is what the shipped probes bind; the type itself
//! accepts any lowercase tag so new strategies can be registered without
//! touching this crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lowercase tag identifying which probe strategy a machine needs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineType(String);

pub const SERVER: &str = "server";
pub const NETWORK_DEVICE: &str = "network-device";
pub const GENERIC: &str = "generic";

impl MachineType {
    pub fn server() -> Self {
        Self(SERVER.to_string())
    }

    pub fn network_device() -> Self {
        Self(NETWORK_DEVICE.to_string())
    }

    pub fn generic() -> Self {
        Self(GENERIC.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MachineType {
    type Err = String;

    /// Parses a tag, normalizing case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return Err("machine type cannot be empty".to_string());
        }
        Ok(Self(tag))
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
