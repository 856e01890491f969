// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness: every spec runs `baton` against its own state directory.

use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

const BATON_VARS: &[&str] = &[
    "BATON_ADMIN_ADDR",
    "BATON_PROXY_SERVER",
    "BATON_UPSTREAM_HOST",
    "BATON_PORT_RANGE",
    "BATON_HEALTH_ATTEMPTS",
    "BATON_HEALTH_INTERVAL_MS",
    "BATON_COMMAND_TIMEOUT_MS",
    "BATON_CONTROL_PLANE_ADDR",
    "BATON_LOG_FILE",
];

/// A scratch host: state directory plus a place for input files.
pub struct Host {
    state: TempDir,
    files: TempDir,
}

impl Host {
    pub fn empty() -> Self {
        Self { state: tempfile::tempdir().unwrap(), files: tempfile::tempdir().unwrap() }
    }

    pub fn state_dir(&self) -> &Path {
        self.state.path()
    }

    /// Write an input file and return its path.
    pub fn file(&self, name: &str, body: &str) -> PathBuf {
        let path = self.files.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    /// Install an executable shell script as `name` on the spec's `PATH`.
    pub fn fake_bin(&self, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;
        let bin = self.files.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let path = bin.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Seed an application record as the agent would have written it.
    pub fn record(&self, app_id: &str, record: serde_json::Value) {
        let dir = self.state.path().join("apps");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.json", app_id)), record.to_string()).unwrap();
    }

    pub fn baton(&self) -> Spec {
        let mut cmd = Command::cargo_bin("baton").unwrap();
        for var in BATON_VARS {
            cmd.env_remove(var);
        }
        let path = format!("{}:/usr/bin:/bin", self.files.path().join("bin").display());
        cmd.env("BATON_STATE_DIR", self.state.path())
            .env("BATON_LOG", "warn")
            .env("PATH", path);
        Spec { cmd }
    }
}

/// `baton` without a state directory, for commands that never touch one.
pub fn cli() -> Spec {
    Spec { cmd: Command::cargo_bin("baton").unwrap() }
}

pub struct Spec {
    cmd: Command,
}

impl Spec {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> Outcome {
        let output = self.cmd.output().unwrap();
        let outcome = Outcome { output };
        assert!(outcome.output.status.success(), "expected success\n{}", outcome.describe());
        outcome
    }

    pub fn exits_with(mut self, code: i32) -> Outcome {
        let output = self.cmd.output().unwrap();
        let outcome = Outcome { output };
        assert_eq!(outcome.output.status.code(), Some(code), "{}", outcome.describe());
        outcome
    }
}

pub struct Outcome {
    output: Output,
}

impl Outcome {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout lacks {:?}\n{}", needle, self.describe());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "stderr lacks {:?}\n{}", needle, self.describe());
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }

    fn describe(&self) -> String {
        format!(
            "status: {:?}\nstdout:\n{}\nstderr:\n{}",
            self.output.status,
            self.stdout(),
            self.stderr()
        )
    }
}
