//! # Batch Report Model
//!
//! The sealed result of one diagnostics batch: one entry per input machine,
//! in input order, plus derived summary counts and a flat row view for
//! tabular display or CSV export.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{DiagnosticError, DiagnosticErrorKind};
use crate::machine::descriptor::MachineDescriptor;

/// Marker written into report columns that do not apply to a row, so every
/// row carries the same column set.
pub const EMPTY_MARKER: &str = "-";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    Failed,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        }
    }
}

/// One named check inside a successful diagnostic.
#[derive(Clone, Debug)]
pub struct CheckResult {
    pub check: String,
    pub status: CheckStatus,
    pub duration: Duration,
    pub details: String,
    pub commands_run: Vec<String>,
    /// How many times the check ran; failed checks may retry once.
    pub attempts: u32,
}

/// Payload for a machine whose diagnostic settled successfully.
///
/// "Successfully" means the probe ran to completion; individual checks
/// inside the outcome may still have failed.
#[derive(Clone, Debug)]
pub struct DiagnosticOutcome {
    pub checks: Vec<CheckResult>,
    /// Flat measured values, e.g. `ping_latency_ms`.
    pub metrics: BTreeMap<String, f64>,
    pub detail: String,
    pub completed_at: DateTime<Utc>,
}

impl DiagnosticOutcome {
    /// Outcome with no per-check breakdown, for probes that report a single
    /// observation.
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            metrics: BTreeMap::new(),
            detail: detail.into(),
            completed_at: Utc::now(),
        }
    }

    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.status == CheckStatus::Passed)
    }

    pub fn checks_passed(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Passed)
            .count()
    }
}

/// One machine's slot in the sealed report.
#[derive(Clone, Debug)]
pub struct BatchEntry {
    pub descriptor: MachineDescriptor,
    pub result: Result<DiagnosticOutcome, DiagnosticError>,
}

impl BatchEntry {
    pub fn status_str(&self) -> &'static str {
        match self.result {
            Ok(_) => "success",
            Err(_) => "error",
        }
    }
}

/// Ordered, read-only outcome of a whole batch.
///
/// Entries are in original input order regardless of completion order.
/// Sealed on construction; no component mutates it afterwards.
#[derive(Clone, Debug)]
pub struct BatchResult {
    entries: Vec<BatchEntry>,
}

impl BatchResult {
    pub fn new(entries: Vec<BatchEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Derived counts over the sealed entries.
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.entries.len(),
            ..BatchSummary::default()
        };
        for entry in &self.entries {
            match &entry.result {
                Ok(outcome) => {
                    summary.succeeded += 1;
                    summary.checks_total += outcome.checks.len();
                    summary.checks_passed += outcome.checks_passed();
                }
                Err(error) => {
                    summary.failed += 1;
                    *summary.failures_by_kind.entry(error.kind).or_insert(0) += 1;
                }
            }
        }
        summary
    }

    /// Flat per-machine rows with a consistent column set.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.entries.iter().map(ReportRow::from_entry).collect()
    }
}

/// Success/error tallies derived from a [`BatchResult`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures_by_kind: BTreeMap<DiagnosticErrorKind, usize>,
    pub checks_total: usize,
    pub checks_passed: usize,
}

impl BatchSummary {
    /// Share of individual checks that passed, if any ran.
    pub fn check_pass_rate(&self) -> Option<f64> {
        if self.checks_total == 0 {
            return None;
        }
        Some(self.checks_passed as f64 / self.checks_total as f64 * 100.0)
    }
}

/// One machine rendered as flat strings, ready for a table or a CSV writer.
///
/// Columns that do not apply to the row (outcome fields on an error row and
/// vice versa) hold [`EMPTY_MARKER`], never go missing.
#[derive(Clone, Debug, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub ip_address: String,
    pub machine_type: String,
    pub status: String,
    pub checks: String,
    pub detail: String,
    /// `key=value` pairs of the outcome's measured metrics.
    pub metrics: String,
    pub error_kind: String,
    pub error_message: String,
    pub completed_at: String,
}

impl ReportRow {
    fn from_entry(entry: &BatchEntry) -> Self {
        let d = &entry.descriptor;
        let mut row = Self {
            name: d.name.clone(),
            ip_address: d.address.to_string(),
            machine_type: d.machine_type.to_string(),
            status: entry.status_str().to_string(),
            checks: EMPTY_MARKER.to_string(),
            detail: EMPTY_MARKER.to_string(),
            metrics: EMPTY_MARKER.to_string(),
            error_kind: EMPTY_MARKER.to_string(),
            error_message: EMPTY_MARKER.to_string(),
            completed_at: EMPTY_MARKER.to_string(),
        };
        match &entry.result {
            Ok(outcome) => {
                if !outcome.checks.is_empty() {
                    row.checks =
                        format!("{}/{}", outcome.checks_passed(), outcome.checks.len());
                }
                if !outcome.detail.is_empty() {
                    row.detail = outcome.detail.clone();
                }
                if !outcome.metrics.is_empty() {
                    row.metrics = outcome
                        .metrics
                        .iter()
                        .map(|(key, value)| format!("{key}={value:.2}"))
                        .collect::<Vec<String>>()
                        .join(", ");
                }
                row.completed_at = outcome.completed_at.to_rfc3339();
            }
            Err(error) => {
                row.error_kind = error.kind.as_str().to_string();
                row.error_message = error.message.clone();
            }
        }
        row
    }
}
