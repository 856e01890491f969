// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executable lookup on the search path.

use std::ffi::OsString;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Resolve `command` to an executable file.
///
/// Names containing `/` are taken as paths (relative ones against `cwd`
/// when given); bare names are searched in `path_var`, falling back to the
/// agent's own `PATH`.
pub fn resolve_executable(
    command: &str,
    path_var: Option<&str>,
    cwd: Option<&Path>,
) -> Option<PathBuf> {
    if command.is_empty() {
        return None;
    }

    if command.contains('/') {
        let candidate = match cwd {
            Some(dir) if Path::new(command).is_relative() => dir.join(command),
            _ => PathBuf::from(command),
        };
        return is_executable(&candidate).then_some(candidate);
    }

    let search = path_var.map(OsString::from).or_else(|| std::env::var_os("PATH"))?;
    std::env::split_paths(&search).map(|dir| dir.join(command)).find(|p| is_executable(p))
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
