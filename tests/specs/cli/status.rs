// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `baton status` specs

use crate::prelude::*;

fn web_record() -> serde_json::Value {
    serde_json::json!({
        "app_id": "web",
        "deployment_id": "dep-7",
        "container_id": "c0ffee",
        "container_name": "web-dep-7",
        "port": 10003,
        "domains": ["a.example.com"],
        "status": "running",
        "updated_at_ms": 1000
    })
}

#[test]
fn empty_state_has_no_applications() {
    Host::empty().baton().args(&["status"]).passes().stdout_has("No applications deployed");
}

#[test]
fn lists_recorded_applications() {
    let host = Host::empty();
    host.record("web", web_record());

    host.baton()
        .args(&["status"])
        .passes()
        .stdout_has("web  running  port=10003  container=web-dep-7  domains=a.example.com");
}

#[test]
fn single_application_as_json() {
    let host = Host::empty();
    host.record("web", web_record());

    let out = host.baton().args(&["status", "web", "-o", "json"]).passes();
    similar_asserts::assert_eq!(out.json(), web_record());
}

#[test]
fn unknown_application_fails() {
    Host::empty()
        .baton()
        .args(&["status", "api"])
        .exits_with(1)
        .stderr_has("no deployment recorded for api");
}

#[test]
fn logs_go_to_state_dir() {
    let host = Host::empty();
    host.baton().args(&["status"]).passes();
    assert!(host.state_dir().join("baton.log").is_file());
}
