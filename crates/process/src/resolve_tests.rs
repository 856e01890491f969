// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;

fn write_file(dir: &Path, name: &str, mode: u32) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    path
}

#[test]
fn finds_executable_on_search_path() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_file(dir.path(), "tool", 0o755);
    let search = dir.path().to_str().unwrap();
    assert_eq!(resolve_executable("tool", Some(search), None), Some(tool));
}

#[test]
fn skips_non_executable_files() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "tool", 0o644);
    let search = dir.path().to_str().unwrap();
    assert_eq!(resolve_executable("tool", Some(search), None), None);
}

#[test]
fn relative_path_resolves_against_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let tool = write_file(dir.path(), "run.sh", 0o755);
    assert_eq!(resolve_executable("./run.sh", None, Some(dir.path())), Some(dir.path().join("./run.sh")));
    assert!(tool.exists());
}

#[test]
fn missing_and_empty_commands_are_unresolved() {
    assert_eq!(resolve_executable("", None, None), None);
    assert_eq!(resolve_executable("definitely-not-a-real-binary-xyz", None, None), None);
    assert_eq!(resolve_executable("/nonexistent/bin/tool", None, None), None);
}

#[test]
fn resolves_sh_from_agent_path() {
    assert!(resolve_executable("sh", None, None).is_some());
}
