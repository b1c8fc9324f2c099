//! The central **abstraction** for diagnostic execution.
//!
//! This module defines the one capability a machine exposes to the runner:
//! run its machine-type-specific diagnostic. Strategies are bound in a flat
//! [`ProbeRegistry`] keyed by machine type, so new types register without
//! any change to the runner or the validator.
//!
//! **Architectural note:**
//! The runner depends only on [`Probe`]; concrete probe crates plug in from
//! the outside. One registry value travels through a batch explicitly;
//! there is no process-wide binding table.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use diagr_common::error::{DiagnosticError, InvariantViolation};
use diagr_common::machine::descriptor::MachineDescriptor;
use diagr_common::machine::machine_type::MachineType;
use diagr_common::report::DiagnosticOutcome;

/// Strategy for running one machine's diagnostic.
///
/// Cancellation is cooperative: a probe that outlives its budget is
/// abandoned by the runner, not force-stopped, so implementations must not
/// hold state that sibling invocations depend on.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn run(
        &self,
        descriptor: &MachineDescriptor,
    ) -> Result<DiagnosticOutcome, DiagnosticError>;
}

/// Flat `machine_type` -> probe bindings, plus an optional fallback used
/// for tags the unknown-type policy lets through.
#[derive(Default)]
pub struct ProbeRegistry {
    bindings: HashMap<MachineType, Arc<dyn Probe>>,
    fallback: Option<Arc<dyn Probe>>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, machine_type: MachineType, probe: Arc<dyn Probe>) {
        self.bindings.insert(machine_type, probe);
    }

    pub fn set_fallback(&mut self, probe: Arc<dyn Probe>) {
        self.fallback = Some(probe);
    }

    /// Whether a tag has its own binding (the fallback does not count).
    pub fn is_known(&self, machine_type: &MachineType) -> bool {
        self.bindings.contains_key(machine_type)
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    fn resolve(&self, machine_type: &MachineType) -> Option<Arc<dyn Probe>> {
        self.bindings
            .get(machine_type)
            .or(self.fallback.as_ref())
            .cloned()
    }
}

/// Runtime pairing of one descriptor with its probe strategy.
///
/// Owned exclusively by the runner for the duration of one diagnostic call
/// and discarded after.
pub struct Machine {
    pub descriptor: MachineDescriptor,
    probe: Arc<dyn Probe>,
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl Machine {
    /// Pure construction from a validated descriptor.
    ///
    /// Fails only when the registry cannot resolve a type the validator let
    /// through, which means the validator/registry contract was broken.
    pub fn create(
        descriptor: MachineDescriptor,
        registry: &ProbeRegistry,
    ) -> Result<Self, InvariantViolation> {
        let probe = registry.resolve(&descriptor.machine_type).ok_or_else(|| {
            InvariantViolation::UnboundMachineType(descriptor.machine_type.to_string())
        })?;
        Ok(Self { descriptor, probe })
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub async fn run_diagnostic(&self) -> Result<DiagnosticOutcome, DiagnosticError> {
        self.probe.run(&self.descriptor).await
    }
}
