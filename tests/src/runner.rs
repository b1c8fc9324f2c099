#![cfg(test)]
//! Concurrency contracts of the diagnostics runner: deterministic output
//! order, bounded parallelism, timeout and panic isolation, batch
//! deadline behavior.

use std::sync::Arc;
use std::time::Duration;

use diagr_common::config::{RunConfig, UnknownTypePolicy};
use diagr_common::error::DiagnosticErrorKind;
use diagr_core::machine::Probe;
use diagr_core::{aggregator, runner};

use crate::support::{GatedProbe, HangProbe, PanicProbe, ScriptedProbe, machine, machines_with};

fn config(limit: usize, timeout: Duration, deadline: Option<Duration>) -> RunConfig {
    RunConfig {
        concurrency_limit: limit,
        probe_timeout: timeout,
        batch_deadline: deadline,
        unknown_types: UnknownTypePolicy::Fallback,
    }
}

#[tokio::test]
async fn output_order_matches_input_despite_completion_order() {
    // Delays are deliberately inverted so "a" settles last and "d" first.
    let probe = ScriptedProbe::new()
        .succeeds("a", Duration::from_millis(150))
        .succeeds("b", Duration::from_millis(100))
        .succeeds("c", Duration::from_millis(50))
        .succeeds("d", Duration::ZERO);
    let machines = machines_with(Arc::new(probe), &["a", "b", "c", "d"]);
    let descriptors: Vec<_> = machines.iter().map(|m| m.descriptor.clone()).collect();

    let settled = runner::run_all(
        machines,
        &config(10, Duration::from_secs(5), None),
    )
    .await;
    assert_eq!(settled.len(), 4);

    let batch = aggregator::aggregate(descriptors, settled).unwrap();
    let names: Vec<&str> = batch
        .entries()
        .iter()
        .map(|e| e.descriptor.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
    assert!(batch.entries().iter().all(|e| e.result.is_ok()));
}

#[tokio::test]
async fn timeout_settles_as_timeout_and_spares_siblings() {
    let ok: Arc<dyn Probe> = Arc::new(ScriptedProbe::new());
    let machines = vec![
        machine("fast1", "10.0.0.1", ok.clone()),
        machine("stuck", "10.0.0.2", Arc::new(HangProbe)),
        machine("fast2", "10.0.0.3", ok),
    ];

    let settled = runner::run_all(
        machines,
        &config(10, Duration::from_millis(100), None),
    )
    .await;

    let by_index = |i: usize| settled.iter().find(|(idx, _)| *idx == i).unwrap();
    assert!(by_index(0).1.is_ok());
    assert!(by_index(2).1.is_ok());
    let err = by_index(1).1.as_ref().unwrap_err();
    assert_eq!(err.kind, DiagnosticErrorKind::Timeout);
    assert_eq!(err.machine, "stuck");
}

#[tokio::test]
async fn panic_is_contained_as_probe_internal() {
    let ok: Arc<dyn Probe> = Arc::new(ScriptedProbe::new());
    let machines = vec![
        machine("sane1", "10.0.0.1", ok.clone()),
        machine("mad", "10.0.0.2", Arc::new(PanicProbe)),
        machine("sane2", "10.0.0.3", ok),
    ];

    let settled = runner::run_all(
        machines,
        &config(10, Duration::from_secs(5), None),
    )
    .await;
    assert_eq!(settled.len(), 3);

    let by_index = |i: usize| settled.iter().find(|(idx, _)| *idx == i).unwrap();
    assert!(by_index(0).1.is_ok());
    assert!(by_index(2).1.is_ok());
    let err = by_index(1).1.as_ref().unwrap_err();
    assert_eq!(err.kind, DiagnosticErrorKind::ProbeInternal);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn at_most_limit_probes_run_simultaneously() {
    let gate = GatedProbe::new();
    let probe: Arc<dyn Probe> = gate.clone();
    let machines = machines_with(probe, &["m1", "m2", "m3", "m4", "m5"]);

    let cfg = config(2, Duration::from_secs(10), None);
    let run = tokio::spawn(async move { runner::run_all(machines, &cfg).await });

    // Let the first admissions block on the gate before opening it one
    // invocation at a time.
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(40)).await;
        gate.release(1);
    }

    let settled = run.await.unwrap();
    assert_eq!(settled.len(), 5);
    assert!(settled.iter().all(|(_, r)| r.is_ok()));
    assert_eq!(gate.peak(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn machines_beyond_the_limit_are_admitted_in_input_order() {
    let gate = GatedProbe::new();
    let probe: Arc<dyn Probe> = gate.clone();
    let names = ["m1", "m2", "m3", "m4", "m5", "m6"];
    let machines = machines_with(probe, &names);

    // One slot, released one probe at a time, so admissions serialize and
    // any ordering slip would show up in the start log.
    let cfg = config(1, Duration::from_secs(10), None);
    let run = tokio::spawn(async move { runner::run_all(machines, &cfg).await });

    for _ in 0..names.len() {
        tokio::time::sleep(Duration::from_millis(30)).await;
        gate.release(1);
    }

    let settled = run.await.unwrap();
    assert!(settled.iter().all(|(_, r)| r.is_ok()));
    assert_eq!(gate.started(), names);
}

#[tokio::test]
async fn batch_deadline_settles_pending_machines_without_starting_them() {
    let probe = ScriptedProbe::new()
        .succeeds("first", Duration::from_millis(150))
        .succeeds("second", Duration::from_millis(150))
        .succeeds("third", Duration::from_millis(150));
    let machines = machines_with(Arc::new(probe), &["first", "second", "third"]);

    // One slot: "first" is admitted immediately and allowed to finish past
    // the deadline; the other two never start.
    let settled = runner::run_all(
        machines,
        &config(
            1,
            Duration::from_secs(5),
            Some(Duration::from_millis(50)),
        ),
    )
    .await;

    let by_index = |i: usize| settled.iter().find(|(idx, _)| *idx == i).unwrap();
    assert!(by_index(0).1.is_ok());
    for i in [1, 2] {
        let err = by_index(i).1.as_ref().unwrap_err();
        assert_eq!(err.kind, DiagnosticErrorKind::BatchTimeout);
    }
}
