//! # Batch Service
//!
//! Implements the core "run a diagnostics batch" use case.
//!
//! This service wires the pipeline together: validate raw entries, pair
//! each descriptor with its probe, fan the diagnostics out through the
//! runner, and seal the ordered report.

use tracing::{debug, info};

use diagr_common::config::RunConfig;
use diagr_common::report::BatchResult;

use crate::machine::{Machine, ProbeRegistry};
use crate::validator::{self, RawConfigEntry, RejectedEntry, Validation};
use crate::{aggregator, runner};

/// A finished batch: the sealed report plus the entries validation threw
/// out before anything ran.
pub struct CompletedBatch {
    pub result: BatchResult,
    pub rejected: Vec<RejectedEntry>,
}

/// Application service for one diagnostics batch.
///
/// Holds the probe registry; everything else about a run travels in the
/// [`RunConfig`] passed per call, so services are cheap to share and no
/// run leaks state into the next.
pub struct BatchService {
    registry: ProbeRegistry,
}

impl BatchService {
    pub fn new(registry: ProbeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    /// Runs diagnostics for every valid entry and aggregates the outcome.
    ///
    /// Entry-level and machine-level failures are contained and reported;
    /// the only error path out of here is a broken invariant between the
    /// pipeline stages.
    pub async fn run(
        &self,
        entries: &[RawConfigEntry],
        cfg: &RunConfig,
    ) -> anyhow::Result<CompletedBatch> {
        let Validation {
            descriptors,
            rejected,
        } = validator::validate(entries, &self.registry, cfg.unknown_types);
        info!(
            valid = descriptors.len(),
            rejected = rejected.len(),
            "validated configuration entries"
        );

        let mut machines = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            machines.push(Machine::create(descriptor.clone(), &self.registry)?);
        }

        let settled = runner::run_all(machines, cfg).await;
        let result = aggregator::aggregate(descriptors, settled)?;
        debug!(machines = result.len(), "batch sealed");

        Ok(CompletedBatch { result, rejected })
    }
}
