// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `baton fetch` specs, against a scripted git CLI.

use crate::prelude::*;

#[test]
fn streams_clone_progress() {
    let host = Host::empty();
    host.fake_bin("git", r#"echo "Cloning into '$5'..."; mkdir -p "$5""#);
    let dest = host.state_dir().join("src");

    host.baton()
        .args(&["fetch", "https://example.com/app.git", dest.to_str().unwrap()])
        .passes()
        .stdout_has("Cloning into")
        .stdout_has("fetched https://example.com/app.git");
}

#[test]
fn existing_destination_is_refused() {
    let host = Host::empty();
    host.fake_bin("git", "exit 0");

    host.baton()
        .args(&["fetch", "https://example.com/app.git", host.state_dir().to_str().unwrap()])
        .exits_with(1)
        .stderr_has("exists");
}

#[test]
fn clone_failure_is_reported() {
    let host = Host::empty();
    host.fake_bin("git", "echo 'fatal: repository not found' >&2; exit 128");
    let dest = host.state_dir().join("src");

    host.baton()
        .args(&["fetch", "https://example.com/missing.git", dest.to_str().unwrap()])
        .exits_with(1)
        .stderr_has("repository not found");
}
