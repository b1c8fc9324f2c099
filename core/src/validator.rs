//! # Configuration Validation
//!
//! Turns raw, untyped configuration entries into typed machine
//! descriptors. Every entry is judged on its own: a malformed entry lands
//! in the rejected list with its index and reason, and never takes the
//! rest of the batch down with it.

use std::collections::HashSet;
use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::debug;

use diagr_common::config::UnknownTypePolicy;
use diagr_common::error::ValidationError;
use diagr_common::machine::address::HostAddress;
use diagr_common::machine::descriptor::MachineDescriptor;
use diagr_common::machine::machine_type::MachineType;

use crate::machine::ProbeRegistry;

/// An already-decoded generic record from the ingestion boundary.
///
/// The core never parses JSON text itself; malformed JSON is the ingestion
/// layer's problem and produces zero entries here.
pub type RawConfigEntry = Value;

/// One entry the validator threw out, by input position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedEntry {
    pub index: usize,
    pub reason: ValidationError,
}

/// Outcome of validating a whole batch of raw entries.
///
/// Conservation holds: `descriptors.len() + rejected.len()` always equals
/// the number of input entries, and descriptor order is input order with
/// rejected indices skipped.
#[derive(Debug, Default)]
pub struct Validation {
    pub descriptors: Vec<MachineDescriptor>,
    pub rejected: Vec<RejectedEntry>,
}

/// Validates raw entries against the descriptor schema.
///
/// Pure over its inputs. The registry supplies the known machine-type set;
/// `policy` decides whether an unknown tag is rejected or routed to the
/// registry's fallback probe.
pub fn validate(
    entries: &[RawConfigEntry],
    registry: &ProbeRegistry,
    policy: UnknownTypePolicy,
) -> Validation {
    let mut out = Validation::default();
    let mut seen_names: HashSet<String> = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        match validate_entry(entry, &seen_names, registry, policy) {
            Ok(descriptor) => {
                seen_names.insert(descriptor.name.clone());
                out.descriptors.push(descriptor);
            }
            Err(reason) => {
                debug!("rejected entry {index}: {reason}");
                out.rejected.push(RejectedEntry { index, reason });
            }
        }
    }

    debug_assert_eq!(out.descriptors.len() + out.rejected.len(), entries.len());
    out
}

fn validate_entry(
    entry: &RawConfigEntry,
    seen_names: &HashSet<String>,
    registry: &ProbeRegistry,
    policy: UnknownTypePolicy,
) -> Result<MachineDescriptor, ValidationError> {
    let fields = entry
        .as_object()
        .ok_or_else(|| ValidationError::mismatch("entry", "object"))?;

    let name = required_str(fields, "name")?.to_string();
    if seen_names.contains(&name) {
        return Err(ValidationError::DuplicateName(name));
    }

    let address = required_str(fields, "ip_address")?
        .parse::<HostAddress>()
        .map_err(|_| ValidationError::mismatch("ip_address", "IP address or hostname"))?;

    let machine_type = MachineType::from_str(required_str(fields, "machine_type")?)
        .map_err(|_| ValidationError::mismatch("machine_type", "non-empty string"))?;

    if !registry.is_known(&machine_type) {
        let permitted = policy == UnknownTypePolicy::Fallback && registry.has_fallback();
        if !permitted {
            return Err(ValidationError::UnknownMachineType(
                machine_type.to_string(),
            ));
        }
    }

    let mut descriptor = MachineDescriptor::new(name, address, machine_type);
    descriptor.params = extra_params(fields)?;
    Ok(descriptor)
}

/// Fetches a required field as a non-empty trimmed string.
fn required_str<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str, ValidationError> {
    match fields.get(key) {
        None | Some(Value::Null) => Err(ValidationError::missing(key)),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Err(ValidationError::mismatch(key, "non-empty string"))
            } else {
                Ok(s)
            }
        }
        Some(_) => Err(ValidationError::mismatch(key, "string")),
    }
}

/// Collects everything beyond the required fields, applying the parameter
/// schema. Today that schema types `expected_software` as an array of
/// strings; unknown extras pass through untouched for the probe to read.
fn extra_params(fields: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
    const REQUIRED: [&str; 3] = ["name", "ip_address", "machine_type"];

    let mut params = Map::new();
    for (key, value) in fields {
        if REQUIRED.contains(&key.as_str()) {
            continue;
        }
        if key == "expected_software" && !is_string_array(value) {
            return Err(ValidationError::mismatch(
                "expected_software",
                "array of strings",
            ));
        }
        params.insert(key.clone(), value.clone());
    }
    Ok(params)
}

fn is_string_array(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().all(Value::is_string),
        _ => false,
    }
}
