use async_trait::async_trait;
use tracing::debug;

use diagr_common::error::DiagnosticError;
use diagr_common::machine::descriptor::MachineDescriptor;
use diagr_common::report::DiagnosticOutcome;
use diagr_core::machine::Probe;

use crate::checks::{self, OutcomeBuilder};

/// Minimal connectivity-style diagnostic, also the fallback for machine
/// types without a dedicated probe.
///
/// Unlike the richer probes, an unreachable machine settles here as a
/// `ConnectionFailed` error: reachability is the only thing this probe
/// asserts, so losing it leaves nothing to report as an outcome.
pub struct GenericProbe;

#[async_trait]
impl Probe for GenericProbe {
    async fn run(
        &self,
        descriptor: &MachineDescriptor,
    ) -> Result<DiagnosticOutcome, DiagnosticError> {
        debug!("running generic diagnostics for {}", descriptor.name);
        let mut outcome = OutcomeBuilder::new();
        outcome
            .run("ping_check", true, || checks::ping_check(&descriptor.address))
            .await;
        let outcome = outcome.seal();

        if !outcome.passed() {
            return Err(DiagnosticError::connection_failed(
                &descriptor.name,
                outcome.detail,
            ));
        }
        Ok(outcome)
    }
}
