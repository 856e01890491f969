// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn baton_no_args_shows_usage_and_fails() {
    cli().exits_with(2).stderr_has("Usage:");
}

#[test]
fn baton_help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("deploy")
        .stdout_has("status")
        .stdout_has("fetch");
}

#[test]
fn baton_deploy_help_shows_descriptor_argument() {
    cli().args(&["deploy", "--help"]).passes().stdout_has("<DESCRIPTOR>");
}

#[test]
fn baton_fetch_help_shows_branch_option() {
    cli().args(&["fetch", "--help"]).passes().stdout_has("--branch");
}

#[test]
fn baton_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has(env!("CARGO_PKG_VERSION"));
}
