use async_trait::async_trait;
use tracing::debug;

use diagr_common::error::DiagnosticError;
use diagr_common::machine::descriptor::MachineDescriptor;
use diagr_common::report::DiagnosticOutcome;
use diagr_core::machine::Probe;

use crate::checks::{self, OutcomeBuilder};

/// Switches and routers drift further than servers.
const DRIFT_RANGE: (f64, f64) = (-7.0, 7.0);

/// Diagnostic for switches, routers, and similar gear: reachability and
/// clock sync. No package inventory; firmware state is outside the
/// shipped checks.
pub struct NetworkDeviceProbe;

#[async_trait]
impl Probe for NetworkDeviceProbe {
    async fn run(
        &self,
        descriptor: &MachineDescriptor,
    ) -> Result<DiagnosticOutcome, DiagnosticError> {
        debug!("running network-device diagnostics for {}", descriptor.name);
        let mut outcome = OutcomeBuilder::new();
        outcome
            .run("ping_check", true, || checks::ping_check(&descriptor.address))
            .await;
        outcome
            .run("clock_check", true, || checks::clock_check(DRIFT_RANGE))
            .await;
        Ok(outcome.seal())
    }
}
