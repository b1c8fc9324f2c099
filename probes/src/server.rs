use async_trait::async_trait;
use tracing::debug;

use diagr_common::error::DiagnosticError;
use diagr_common::machine::descriptor::MachineDescriptor;
use diagr_common::report::DiagnosticOutcome;
use diagr_core::machine::Probe;

use crate::checks::{self, OutcomeBuilder};

/// Plausible clock drift for servers (seconds).
const DRIFT_RANGE: (f64, f64) = (-5.0, 5.0);

/// Full server diagnostic: reachability, software inventory, clock sync.
pub struct ServerProbe;

#[async_trait]
impl Probe for ServerProbe {
    async fn run(
        &self,
        descriptor: &MachineDescriptor,
    ) -> Result<DiagnosticOutcome, DiagnosticError> {
        debug!("running server diagnostics for {}", descriptor.name);
        let mut outcome = OutcomeBuilder::new();
        outcome
            .run("ping_check", true, || checks::ping_check(&descriptor.address))
            .await;
        outcome
            .run("software_check", false, || checks::software_check(descriptor))
            .await;
        outcome
            .run("clock_check", true, || checks::clock_check(DRIFT_RANGE))
            .await;
        Ok(outcome.seal())
    }
}
