use serde_json::{Map, Value};

use crate::machine::address::HostAddress;
use crate::machine::machine_type::MachineType;

/// A validated, immutable description of one machine to diagnose.
///
/// Only the validator constructs these; a descriptor that exists has
/// already passed schema validation, so downstream stages never re-check
/// its fields.
#[derive(Clone, Debug, PartialEq)]
pub struct MachineDescriptor {
    /// Unique within the batch, non-empty.
    pub name: String,
    pub address: HostAddress,
    pub machine_type: MachineType,
    /// Type-specific extras, e.g. `expected_software` for servers.
    pub params: Map<String, Value>,
}

impl MachineDescriptor {
    pub fn new(name: String, address: HostAddress, machine_type: MachineType) -> Self {
        Self {
            name,
            address,
            machine_type,
            params: Map::new(),
        }
    }

    /// Reads a parameter that the validator typed as an array of strings.
    ///
    /// Missing parameter reads as empty, same as the empty array.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.params.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}
