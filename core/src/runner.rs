//! # Diagnostics Runner
//!
//! Fans one tokio task out per machine behind a semaphore admission gate,
//! so at most `concurrency_limit` probes run at once while the rest queue
//! in input order. Admission happens in the dispatch loop itself, before a
//! task is spawned, so the semaphore is the loop's only blocking point and
//! excess machines are admitted strictly in input order. Every machine
//! settles exactly once: probe completion, per-machine timeout, batch
//! deadline, or a contained panic all convert into a settled result keyed
//! by the machine's input index.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, warn};

use diagr_common::config::RunConfig;
use diagr_common::error::DiagnosticError;
use diagr_common::report::DiagnosticOutcome;

use crate::machine::Machine;

/// One machine's settled result, keyed by its input index.
pub type SettledResult = (usize, Result<DiagnosticOutcome, DiagnosticError>);

/// Runs every machine's diagnostic concurrently and collects one settled
/// result per machine, in no particular order.
///
/// A failure inside one probe never reaches its siblings: errors settle as
/// `DiagnosticError` values and a panic is caught at the task boundary and
/// converted to `ProbeInternal`. When the batch deadline elapses, machines
/// still waiting for admission settle as `BatchTimeout` without starting;
/// probes already running keep their per-machine budget and their results
/// are recorded.
pub async fn run_all(machines: Vec<Machine>, cfg: &RunConfig) -> Vec<SettledResult> {
    let gate = Arc::new(Semaphore::new(cfg.concurrency_limit.max(1)));
    let deadline = cfg.batch_deadline.map(|d| Instant::now() + d);
    let probe_timeout = cfg.probe_timeout;

    debug!(
        machines = machines.len(),
        limit = cfg.concurrency_limit,
        "dispatching diagnostics"
    );

    let mut settled = Vec::with_capacity(machines.len());
    let mut handles = Vec::new();
    for (index, machine) in machines.into_iter().enumerate() {
        // Admission blocks here, not inside the task, so machines join the
        // gate's queue in input order. A machine still unadmitted at the
        // batch deadline settles without a task ever starting.
        let Some(permit) = admit(gate.clone(), deadline).await else {
            settled.push((index, Err(DiagnosticError::batch_timeout(machine.name()))));
            continue;
        };

        let name = machine.name().to_string();
        let handle = tokio::spawn(async move {
            let _permit = permit;
            debug!("probing {}", machine.name());
            let settled = match timeout(probe_timeout, machine.run_diagnostic()).await {
                Ok(result) => result,
                Err(_) => Err(DiagnosticError::timeout(machine.name(), probe_timeout)),
            };
            (index, settled)
        });
        handles.push((index, name, handle));
    }

    // The settled-results sink. Awaiting the join handles is the only
    // other place results funnel together, so no lock is needed around it.
    for (index, name, handle) in handles {
        match handle.await {
            Ok(result) => settled.push(result),
            Err(join_error) if join_error.is_panic() => {
                warn!("probe for '{name}' panicked");
                settled.push((
                    index,
                    Err(DiagnosticError::probe_internal(&name, "probe panicked")),
                ));
            }
            Err(join_error) => {
                // Not reachable through this module (tasks are never
                // aborted), but a dropped runtime must still settle.
                settled.push((
                    index,
                    Err(DiagnosticError::probe_internal(
                        &name,
                        format!("probe task failed: {join_error}"),
                    )),
                ));
            }
        }
    }
    settled
}

/// Waits for an admission slot, giving up at the batch deadline.
///
/// Called from the dispatch loop only, so there is never more than one
/// waiter and queued machines keep their input order.
async fn admit(gate: Arc<Semaphore>, deadline: Option<Instant>) -> Option<OwnedSemaphorePermit> {
    match deadline {
        Some(at) => timeout_at(at, gate.acquire_owned()).await.ok()?.ok(),
        None => gate.acquire_owned().await.ok(),
    }
}
