#![cfg(test)]
//! End-to-end batch runs: raw JSON entries in, sealed ordered report out.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use diagr_common::config::{RunConfig, UnknownTypePolicy};
use diagr_common::error::{DiagnosticError, DiagnosticErrorKind, ValidationError};
use diagr_core::batch::BatchService;
use diagr_core::machine::ProbeRegistry;
use diagr_core::validator::RawConfigEntry;

use crate::support::ScriptedProbe;

fn entry(name: &str, ip: &str, machine_type: &str) -> RawConfigEntry {
    json!({ "name": name, "ip_address": ip, "machine_type": machine_type })
}

fn quick_config() -> RunConfig {
    RunConfig {
        probe_timeout: Duration::from_secs(5),
        ..RunConfig::default()
    }
}

#[tokio::test]
async fn mixed_success_and_failure_keeps_input_order() {
    let mut registry = ProbeRegistry::new();
    registry.bind(
        "server".parse().unwrap(),
        Arc::new(ScriptedProbe::new().succeeds("srv1", Duration::from_millis(80))),
    );
    registry.bind(
        "network-device".parse().unwrap(),
        Arc::new(ScriptedProbe::new().fails(
            "net1",
            DiagnosticError::connection_failed("net1", "connection refused"),
        )),
    );
    let service = BatchService::new(registry);

    let entries = vec![
        entry("srv1", "10.0.0.1", "server"),
        entry("net1", "10.0.0.2", "network-device"),
    ];
    let batch = service.run(&entries, &quick_config()).await.unwrap();

    assert!(batch.rejected.is_empty());
    let rows = batch.result.rows();
    assert_eq!(rows[0].name, "srv1");
    assert_eq!(rows[0].status, "success");
    assert_eq!(rows[1].name, "net1");
    assert_eq!(rows[1].status, "error");
    assert_eq!(rows[1].error_kind, "connection_failed");

    let summary = batch.result.summary();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(
        summary.failures_by_kind[&DiagnosticErrorKind::ConnectionFailed],
        1
    );
}

#[tokio::test]
async fn rejected_entries_do_not_stop_the_batch() {
    let mut registry = ProbeRegistry::new();
    registry.bind("server".parse().unwrap(), Arc::new(ScriptedProbe::new()));
    let service = BatchService::new(registry);

    let entries = vec![
        entry("good1", "10.0.0.1", "server"),
        json!({ "machine_type": "server", "ip_address": "10.0.0.2" }),
        entry("good1", "10.0.0.3", "server"),
        entry("good2", "10.0.0.4", "server"),
    ];
    let batch = service.run(&entries, &quick_config()).await.unwrap();

    // Conservation: every entry is either a report row or a rejection.
    assert_eq!(batch.result.len() + batch.rejected.len(), entries.len());
    assert_eq!(batch.result.len(), 2);
    assert_eq!(batch.rejected[0].reason, ValidationError::missing("name"));
    assert_eq!(
        batch.rejected[1].reason,
        ValidationError::DuplicateName("good1".to_string())
    );
}

#[tokio::test]
async fn strict_policy_rejects_unknown_types_end_to_end() {
    let mut registry = ProbeRegistry::new();
    registry.bind("server".parse().unwrap(), Arc::new(ScriptedProbe::new()));
    registry.set_fallback(Arc::new(ScriptedProbe::new()));
    let service = BatchService::new(registry);

    let entries = vec![
        entry("known", "10.0.0.1", "server"),
        entry("mystery", "10.0.0.2", "appliance"),
    ];

    let strict = RunConfig {
        unknown_types: UnknownTypePolicy::Reject,
        ..quick_config()
    };
    let batch = service.run(&entries, &strict).await.unwrap();
    assert_eq!(batch.result.len(), 1);
    assert_eq!(
        batch.rejected[0].reason,
        ValidationError::UnknownMachineType("appliance".to_string())
    );

    // The same entries pass with the fallback policy.
    let batch = service.run(&entries, &quick_config()).await.unwrap();
    assert_eq!(batch.result.len(), 2);
    assert!(batch.rejected.is_empty());
}

#[tokio::test]
async fn shipped_probes_settle_every_machine() {
    let service = BatchService::new(diagr_probes::default_registry());
    let entries = vec![
        entry("srv1", "10.0.0.1", "server"),
        entry("net1", "10.0.0.2", "network-device"),
        entry("box1", "10.0.0.3", "generic"),
    ];

    let batch = service
        .run(&entries, &RunConfig::default())
        .await
        .unwrap();

    // Simulated checks are random, so only shape is asserted: one settled
    // row per machine, in input order.
    assert_eq!(batch.result.len(), 3);
    let names: Vec<String> = batch.result.rows().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["srv1", "net1", "box1"]);
}

#[tokio::test]
async fn empty_input_seals_an_empty_report() {
    let service = BatchService::new(ProbeRegistry::new());
    let batch = service.run(&[], &quick_config()).await.unwrap();
    assert!(batch.result.is_empty());
    assert!(batch.rejected.is_empty());
    assert_eq!(batch.result.summary().total, 0);
}
