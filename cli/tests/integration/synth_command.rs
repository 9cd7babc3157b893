//! Integration tests for `stackcraft synth`, `validate` and `grants`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use predicates::prelude::*;

use crate::support::{CERT, Workspace};

fn synth_json(ws: &Workspace) -> serde_json::Value {
    let assert = ws
        .cmd()
        .args(["synth", "--certificate", CERT])
        .assert()
        .success();
    serde_json::from_slice(&assert.get_output().stdout).expect("synth prints JSON")
}

#[test]
fn test_synth_prints_the_resource_graph() {
    let ws = Workspace::new();
    let graph = synth_json(&ws);
    assert_eq!(graph["stack"], "devops-demo");
    let resources = graph["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 13);
    assert_eq!(resources[0]["id"], "network/devops-demo");
    assert_eq!(resources[12]["id"], "grant/devops-demo-deployer-policy");
}

#[test]
fn test_synth_is_deterministic() {
    let ws = Workspace::new();
    assert_eq!(synth_json(&ws), synth_json(&ws));
}

#[test]
fn test_synth_yaml_format() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["synth", "--format", "yaml", "--certificate", CERT])
        .assert()
        .success()
        .stdout(predicate::str::contains("stack: devops-demo"))
        .stdout(predicate::str::contains("listener/devops-demo-lb-https"));
}

#[test]
fn test_synth_out_writes_the_file() {
    let ws = Workspace::new();
    let out = ws.dir.path().join("graph.json");
    ws.cmd()
        .args(["synth", "--certificate", CERT, "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("13 resources written"));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["resources"].as_array().unwrap().len(), 13);
}

#[test]
fn test_synth_certificate_from_env() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("synth")
        .env("STACKCRAFT_CERTIFICATE_ARN", CERT)
        .assert()
        .success()
        .stdout(predicate::str::contains(CERT));
}

#[test]
fn test_synth_without_certificate_is_a_composition_error() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("synth")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("certificate"));
}

#[test]
fn test_synth_without_certificate_json_reports_the_code() {
    let ws = Workspace::new();
    let assert = ws.cmd().args(["synth", "--json"]).assert().code(2);
    let value: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("error is JSON");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "constraint_violation");
}

#[test]
fn test_plain_http_stack_needs_no_certificate() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["config", "set", "listener.protocol", "http"])
        .assert()
        .success();
    ws.cmd()
        .arg("synth")
        .assert()
        .success()
        .stdout(predicate::str::contains("listener/devops-demo-lb-http"));
}

#[test]
fn test_desired_count_beyond_capacity_is_rejected() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["synth", "--certificate", CERT, "--desired-count", "7"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("desired_count"));
}

#[test]
fn test_validate_reports_fingerprint_and_retained() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["validate", "--certificate", CERT])
        .assert()
        .success()
        .stdout(predicate::str::contains("13 resources composed"))
        .stdout(predicate::str::contains("fingerprint"))
        .stdout(predicate::str::contains("[retained]"));
}

#[test]
fn test_validate_json_fingerprint_is_stable() {
    let ws = Workspace::new();
    let run = || {
        let assert = ws
            .cmd()
            .args(["validate", "--json", "--certificate", CERT])
            .assert()
            .success();
        let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
        value["fingerprint"].as_str().unwrap().to_string()
    };
    let first = run();
    assert_eq!(first.len(), 64);
    assert_eq!(first, run());
}

#[test]
fn test_grants_lists_scoped_statements() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["grants", "--certificate", CERT])
        .assert()
        .success()
        .stdout(predicate::str::contains("devops-demo-deployer"))
        .stdout(predicate::str::contains("iam:PassRole"))
        .stdout(predicate::str::contains("registry/devops-demo"));
}
