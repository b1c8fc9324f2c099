//! Simulated diagnostic checks shared by the shipped probes.
//!
//! None of these touch a real machine: latency, packet loss, installed
//! software, and clock drift are modeled with random draws so a batch
//! exercises the whole success/failure surface. The pluggable [`Probe`]
//! contract is where a real transport would slot in.
//!
//! [`Probe`]: diagr_core::machine::Probe

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::Utc;
use tokio::time::{Instant, sleep};

use diagr_common::machine::address::HostAddress;
use diagr_common::machine::descriptor::MachineDescriptor;
use diagr_common::report::{CheckResult, CheckStatus, DiagnosticOutcome};

const RETRY_DELAY: Duration = Duration::from_millis(500);

const PING_LATENCY_MAX_MS: f64 = 300.0;
const PING_LATENCY_THRESHOLD_MS: f64 = 200.0;
const PING_PACKET_LOSS_CHANCE: f64 = 0.1;
const CLOCK_DRIFT_THRESHOLD_SECS: f64 = 1.5;

/// Pool a simulated machine draws its installed software from. Each
/// package has an 80% chance of being present, at a random version.
const SOFTWARE_POOL: &[(&str, &[&str])] = &[
    ("nginx", &["1.18.0", "1.20.1", "1.21.0"]),
    ("python3", &["3.7.9", "3.8.5", "3.9.7", "3.10.4"]),
    ("curl", &["7.68.0", "7.74.0"]),
    ("docker", &["20.10.7", "20.10.12"]),
    ("gcc", &["9.3.0", "10.2.0"]),
    ("node", &["14.17.0", "16.13.0", "17.0.1"]),
    ("java11", &["11.0.10", "11.0.12"]),
    ("postgres", &["12.5", "13.1", "14.0"]),
];

/// What one attempt of a check produced.
pub(crate) struct CheckOutput {
    pub status: CheckStatus,
    pub details: String,
    pub commands_run: Vec<String>,
    pub metrics: Vec<(&'static str, f64)>,
}

impl CheckOutput {
    fn passed(details: String, commands_run: Vec<String>) -> Self {
        Self {
            status: CheckStatus::Passed,
            details,
            commands_run,
            metrics: Vec::new(),
        }
    }

    fn failed(details: String, commands_run: Vec<String>) -> Self {
        Self {
            status: CheckStatus::Failed,
            details,
            commands_run,
            metrics: Vec::new(),
        }
    }

    fn with_metric(mut self, key: &'static str, value: f64) -> Self {
        self.metrics.push((key, value));
        self
    }
}

/// Accumulates check results into one [`DiagnosticOutcome`], handling the
/// retry-once policy and per-check timing.
pub(crate) struct OutcomeBuilder {
    checks: Vec<CheckResult>,
    metrics: BTreeMap<String, f64>,
}

impl OutcomeBuilder {
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// Runs a check, retrying once after [`RETRY_DELAY`] if it failed and
    /// `retry_on_failure` is set. Only the final attempt is recorded, with
    /// the attempt count it took to get there.
    pub async fn run<F, Fut>(&mut self, name: &str, retry_on_failure: bool, check: F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = CheckOutput>,
    {
        let max_attempts: u32 = if retry_on_failure { 2 } else { 1 };
        let mut attempts = 0;
        loop {
            attempts += 1;
            let started = Instant::now();
            let output = check().await;
            let duration = started.elapsed();

            if output.status == CheckStatus::Passed || attempts >= max_attempts {
                for (key, value) in &output.metrics {
                    self.metrics.insert((*key).to_string(), *value);
                }
                self.checks.push(CheckResult {
                    check: name.to_string(),
                    status: output.status,
                    duration,
                    details: output.details,
                    commands_run: output.commands_run,
                    attempts,
                });
                return;
            }
            sleep(RETRY_DELAY).await;
        }
    }

    pub fn seal(self) -> DiagnosticOutcome {
        let failures: Vec<String> = self
            .checks
            .iter()
            .filter(|c| c.status == CheckStatus::Failed)
            .map(|c| format!("{}: {}", c.check, c.details))
            .collect();
        let detail = if failures.is_empty() {
            format!("all {} checks passed", self.checks.len())
        } else {
            failures.join("; ")
        };
        DiagnosticOutcome {
            checks: self.checks,
            metrics: self.metrics,
            detail,
            completed_at: Utc::now(),
        }
    }
}

/// Reachability check: random latency up to 300ms with a 10% loss chance,
/// failing above the 200ms threshold.
pub(crate) async fn ping_check(address: &HostAddress) -> CheckOutput {
    let latency_ms = rand::random_range(0.0..PING_LATENCY_MAX_MS);
    sleep(Duration::from_secs_f64(latency_ms / 1000.0)).await;
    let commands_run = vec![format!("ping -c 1 {address}")];

    let output = if rand::random_bool(PING_PACKET_LOSS_CHANCE) {
        CheckOutput::failed(
            format!("packet lost (attempted latency {latency_ms:.2}ms)"),
            commands_run,
        )
    } else if latency_ms > PING_LATENCY_THRESHOLD_MS {
        CheckOutput::failed(
            format!("latency {latency_ms:.2}ms over {PING_LATENCY_THRESHOLD_MS}ms threshold"),
            commands_run,
        )
    } else {
        CheckOutput::passed(format!("latency {latency_ms:.2}ms"), commands_run)
    };
    output.with_metric("ping_latency_ms", latency_ms)
}

/// Compares the descriptor's `expected_software` entries (`name` or
/// `name==min_version`) against the simulated installed set.
pub(crate) async fn software_check(descriptor: &MachineDescriptor) -> CheckOutput {
    sleep(Duration::from_millis(rand::random_range(50..200))).await;
    let commands_run = vec!["dpkg-query -W -f='${Package}==${Version}\n'".to_string()];

    let expected = descriptor.string_list("expected_software");
    if expected.is_empty() {
        return CheckOutput::passed("no expected software".to_string(), commands_run);
    }

    let installed = simulated_installed();
    let mut issues = Vec::new();
    for entry in &expected {
        let (name, min_version) = parse_software_entry(entry);
        match installed.get(name) {
            None => issues.push(format!("missing '{name}'")),
            Some(found) => {
                if let Some(min) = min_version {
                    if !version_at_least(found, min) {
                        issues.push(format!("'{name}' is {found}, expected >= {min}"));
                    }
                }
            }
        }
    }

    if issues.is_empty() {
        CheckOutput::passed("all expected software ok".to_string(), commands_run)
    } else {
        CheckOutput::failed(issues.join("; "), commands_run)
    }
}

/// Clock sync check against a drift threshold; the plausible drift range
/// varies by machine type.
pub(crate) async fn clock_check(drift_range: (f64, f64)) -> CheckOutput {
    sleep(Duration::from_millis(rand::random_range(20..100))).await;
    let commands_run = vec![
        "date +%s".to_string(),
        "ntpdate -q pool.ntp.org".to_string(),
    ];

    let (min, max) = drift_range;
    let drift = rand::random_range(min..max);
    let output = if drift.abs() > CLOCK_DRIFT_THRESHOLD_SECS {
        CheckOutput::failed(
            format!("drift {drift:.2}s over {CLOCK_DRIFT_THRESHOLD_SECS}s threshold"),
            commands_run,
        )
    } else {
        CheckOutput::passed(format!("drift {drift:.2}s within threshold"), commands_run)
    };
    output.with_metric("clock_drift_secs", drift)
}

fn simulated_installed() -> HashMap<&'static str, &'static str> {
    SOFTWARE_POOL
        .iter()
        .filter(|_| rand::random_bool(0.8))
        .map(|(name, versions)| (*name, versions[rand::random_range(0..versions.len())]))
        .collect()
}

/// Splits "nginx==1.18.0" into a name and a minimum version; a bare name
/// only asserts presence.
fn parse_software_entry(entry: &str) -> (&str, Option<&str>) {
    match entry.split_once("==") {
        Some((name, version)) => (name.trim(), Some(version.trim())),
        None => (entry.trim(), None),
    }
}

/// Dotted-version comparison; unparsable versions compare as "0".
fn version_at_least(installed: &str, min: &str) -> bool {
    parse_version(installed) >= parse_version(min)
}

fn parse_version(s: &str) -> Vec<u64> {
    s.split('.')
        .map(str::parse::<u64>)
        .collect::<Result<Vec<u64>, _>>()
        .unwrap_or_else(|_| vec![0])
}
