use std::path::Path;

use colored::*;

use diagr_common::config::UnknownTypePolicy;
use diagr_core::validator;
use diagr_probes::default_registry;

use crate::ingest;
use crate::terminal::print;

/// Validates a configuration file without probing anything.
pub fn validate(config: &Path) -> anyhow::Result<()> {
    let entries = ingest::load_entries(config)?;
    let registry = default_registry();
    let result = validator::validate(&entries, &registry, UnknownTypePolicy::Fallback);

    print::header("Configuration Check");
    println!(
        "{} of {} entries valid",
        result.descriptors.len().to_string().green().bold(),
        entries.len()
    );
    for descriptor in &result.descriptors {
        println!(
            "  {} {} ({}, {})",
            "+".green(),
            descriptor.name,
            descriptor.address,
            descriptor.machine_type
        );
    }
    print::rejected(&result.rejected);
    Ok(())
}
