use std::time::Duration;

/// Tunables for a single diagnostics batch.
///
/// Built once per run and passed into the runner explicitly; there is no
/// process-wide configuration state.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Maximum number of probes running at the same time.
    ///
    /// Machines beyond the limit queue in input order and are admitted
    /// as slots free up.
    pub concurrency_limit: usize,

    /// Budget for one machine's probe, measured from admission.
    pub probe_timeout: Duration,

    /// Optional wall-clock budget for the whole batch.
    ///
    /// When it elapses, machines still waiting for admission settle as
    /// `BatchTimeout`; probes already running keep their own budget.
    pub batch_deadline: Option<Duration>,

    /// What to do with a `machine_type` no probe is bound to.
    pub unknown_types: UnknownTypePolicy,
}

/// Policy for machine types outside the registry's known set.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnknownTypePolicy {
    /// Reject the entry during validation.
    Reject,
    /// Keep the entry and route it to the registry's fallback probe.
    Fallback,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 10,
            probe_timeout: Duration::from_secs(30),
            batch_deadline: None,
            unknown_types: UnknownTypePolicy::Fallback,
        }
    }
}
