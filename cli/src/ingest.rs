//! Ingestion boundary: configuration file to decoded generic records.
//!
//! All JSON text handling lives here. The core only ever receives
//! fully-decoded entries; a malformed file produces zero entries and a
//! boundary error, never a half-decoded record.

use std::fs;
use std::path::Path;

use anyhow::Context;

use diagr_core::validator::RawConfigEntry;

pub fn load_entries(path: &Path) -> anyhow::Result<Vec<RawConfigEntry>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading configuration file {}", path.display()))?;

    let entries: Vec<RawConfigEntry> = serde_json::from_str(&text).with_context(|| {
        format!(
            "configuration file {} is not a JSON array of machine objects",
            path.display()
        )
    })?;
    Ok(entries)
}
