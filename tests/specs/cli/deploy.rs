// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `baton deploy` specs, against a scripted container CLI.

use crate::prelude::*;

/// A docker CLI whose containers start instantly and report running.
const DOCKER: &str = r#"case "$1" in
  run) echo "Pulling nginx"; echo c0ffee0123456789 ;;
  inspect) echo 'running|' ;;
esac"#;

fn host() -> Host {
    let host = Host::empty();
    host.fake_bin("docker", DOCKER);
    host
}

fn fast(spec: Spec) -> Spec {
    spec.env("BATON_PORT_RANGE", "47100-47199")
        .env("BATON_HEALTH_ATTEMPTS", "2")
        .env("BATON_HEALTH_INTERVAL_MS", "10")
        // Nothing listens here: any route change fails fast
        .env("BATON_ADMIN_ADDR", "127.0.0.1:1")
}

#[test]
fn missing_descriptor_is_usage_error() {
    let host = host();
    host.baton().args(&["deploy", "/nonexistent/deploy.json"]).exits_with(2).stderr_has("cannot read");
}

#[test]
fn invalid_descriptor_is_usage_error() {
    let host = host();
    let path = host.file("deploy.json", r#"{"app_id": "Web App", "image": "nginx", "internal_port": 80}"#);

    host.baton()
        .args(&["deploy", path.to_str().unwrap()])
        .exits_with(2)
        .stderr_has("invalid descriptor");
}

#[test]
fn deploy_without_domains_records_new_container() {
    let host = host();
    let path = host.file(
        "deploy.json",
        r#"{"app_id": "worker", "deployment_id": "dep-1", "image": "worker:1", "internal_port": 9000}"#,
    );

    let out = fast(host.baton()).args(&["deploy", path.to_str().unwrap()]).passes();
    let record = out.json();

    assert_eq!(record["app_id"], "worker");
    assert_eq!(record["container_name"], "worker-dep-1");
    assert_eq!(record["container_id"], "c0ffee0123456789");
    assert_eq!(record["status"], "running");
    let port = record["port"].as_u64().unwrap();
    assert!((47100..=47199).contains(&port));
    assert!(host.state_dir().join("apps/worker.json").is_file());
}

#[test]
fn unreachable_proxy_fails_with_route_switch_tag() {
    let host = host();
    let path = host.file(
        "deploy.json",
        r#"{"app_id": "web", "image": "nginx:1.27", "internal_port": 80, "domains": ["a.example.com"]}"#,
    );

    fast(host.baton())
        .args(&["deploy", path.to_str().unwrap()])
        .exits_with(1)
        .stderr_has("route-switch-failed");

    assert!(!host.state_dir().join("apps/web.json").exists());
}

#[test]
fn unhealthy_container_fails_with_health_check_tag() {
    let host = Host::empty();
    host.fake_bin("docker", r#"case "$1" in run) echo c0ffee ;; inspect) echo 'exited|' ;; esac"#);
    let path = host.file("deploy.json", r#"{"app_id": "web", "image": "nginx", "internal_port": 80}"#);

    fast(host.baton())
        .args(&["deploy", path.to_str().unwrap()])
        .exits_with(1)
        .stderr_has("health-check-failed");
}
