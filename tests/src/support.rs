#![cfg(test)]
//! Probe doubles and descriptor helpers shared by the integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use diagr_common::error::DiagnosticError;
use diagr_common::machine::descriptor::MachineDescriptor;
use diagr_common::report::DiagnosticOutcome;
use diagr_core::machine::{Machine, Probe, ProbeRegistry};

pub fn descriptor(name: &str, ip: &str, machine_type: &str) -> MachineDescriptor {
    MachineDescriptor::new(
        name.to_string(),
        ip.parse().unwrap(),
        machine_type.parse().unwrap(),
    )
}

/// Builds one machine backed directly by the given probe.
pub fn machine(name: &str, ip: &str, probe: Arc<dyn Probe>) -> Machine {
    let mut registry = ProbeRegistry::new();
    registry.set_fallback(probe);
    Machine::create(descriptor(name, ip, "server"), &registry).unwrap()
}

/// Builds a batch of machines all backed by the same probe.
pub fn machines_with(probe: Arc<dyn Probe>, names: &[&str]) -> Vec<Machine> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| machine(name, &format!("10.0.0.{}", i + 1), probe.clone()))
        .collect()
}

struct Play {
    delay: Duration,
    response: Result<DiagnosticOutcome, DiagnosticError>,
}

/// Responds per machine name with a scripted delay and result; machines
/// without a script succeed immediately.
#[derive(Default)]
pub struct ScriptedProbe {
    plays: HashMap<String, Play>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeeds(mut self, name: &str, after: Duration) -> Self {
        self.plays.insert(name.to_string(), Play {
            delay: after,
            response: Ok(DiagnosticOutcome::success(format!("{name} ok"))),
        });
        self
    }

    pub fn fails(mut self, name: &str, error: DiagnosticError) -> Self {
        self.plays.insert(name.to_string(), Play {
            delay: Duration::ZERO,
            response: Err(error),
        });
        self
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn run(
        &self,
        descriptor: &MachineDescriptor,
    ) -> Result<DiagnosticOutcome, DiagnosticError> {
        match self.plays.get(&descriptor.name) {
            Some(play) => {
                if !play.delay.is_zero() {
                    tokio::time::sleep(play.delay).await;
                }
                play.response.clone()
            }
            None => Ok(DiagnosticOutcome::success("ok")),
        }
    }
}

/// Panics on every invocation.
pub struct PanicProbe;

#[async_trait]
impl Probe for PanicProbe {
    async fn run(
        &self,
        _descriptor: &MachineDescriptor,
    ) -> Result<DiagnosticOutcome, DiagnosticError> {
        panic!("probe blew up");
    }
}

/// Never settles within any sane budget; used to trigger timeouts.
pub struct HangProbe;

#[async_trait]
impl Probe for HangProbe {
    async fn run(
        &self,
        _descriptor: &MachineDescriptor,
    ) -> Result<DiagnosticOutcome, DiagnosticError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(DiagnosticOutcome::success("should not get here"))
    }
}

/// Blocks every invocation until externally released, recording the
/// high-water mark of simultaneously running invocations and the order
/// machines started in.
pub struct GatedProbe {
    release: Semaphore,
    running: AtomicUsize,
    peak: AtomicUsize,
    started: Mutex<Vec<String>>,
}

impl GatedProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            release: Semaphore::new(0),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: Mutex::new(Vec::new()),
        })
    }

    pub fn release(&self, n: usize) {
        self.release.add_permits(n);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Machine names in the order their probes started running.
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl Probe for GatedProbe {
    async fn run(
        &self,
        descriptor: &MachineDescriptor,
    ) -> Result<DiagnosticOutcome, DiagnosticError> {
        self.started.lock().unwrap().push(descriptor.name.clone());
        let now_running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_running, Ordering::SeqCst);

        let permit = self.release.acquire().await.expect("gate closed");
        permit.forget();

        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(DiagnosticOutcome::success(format!("{} released", descriptor.name)))
    }
}
