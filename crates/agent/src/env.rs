// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the agent.
//!
//! Malformed values fall back to their defaults with a warning.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use baton_adapters::{DEFAULT_ADMIN_ADDR, DEFAULT_SERVER};
use baton_engine::{DEFAULT_HEALTH_ATTEMPTS, DEFAULT_HEALTH_INTERVAL};

pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_UPSTREAM_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT_RANGE: RangeInclusive<u16> = 10000..=10999;
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parsed_or<T: FromStr>(name: &str, default: T, valid: impl Fn(&T) -> bool) -> T {
    let Some(raw) = var(name) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            tracing::warn!(var = name, value = %raw, "malformed value, using default");
            default
        }
    }
}

/// Resolve state directory: BATON_STATE_DIR > XDG_STATE_HOME/baton > ~/.local/state/baton
pub fn state_dir() -> Option<PathBuf> {
    if let Some(dir) = var("BATON_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Some(xdg) = var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("baton"));
    }
    dirs::home_dir().map(|home| home.join(".local/state/baton"))
}

pub fn admin_addr() -> String {
    var("BATON_ADMIN_ADDR").unwrap_or_else(|| DEFAULT_ADMIN_ADDR.to_string())
}

/// Proxy server block new routes are appended to.
pub fn proxy_server() -> String {
    var("BATON_PROXY_SERVER").unwrap_or_else(|| DEFAULT_SERVER.to_string())
}

pub fn upstream_host() -> String {
    var("BATON_UPSTREAM_HOST").unwrap_or_else(|| DEFAULT_UPSTREAM_HOST.to_string())
}

/// Inclusive upstream port range, written `<start>-<end>`.
pub fn port_range() -> RangeInclusive<u16> {
    let Some(raw) = var("BATON_PORT_RANGE") else {
        return DEFAULT_PORT_RANGE;
    };
    parse_port_range(&raw).unwrap_or_else(|| {
        tracing::warn!(var = "BATON_PORT_RANGE", value = %raw, "malformed value, using default");
        DEFAULT_PORT_RANGE
    })
}

pub(crate) fn parse_port_range(raw: &str) -> Option<RangeInclusive<u16>> {
    let (start, end) = raw.trim().split_once('-')?;
    let start = start.trim().parse::<u16>().ok()?;
    let end = end.trim().parse::<u16>().ok()?;
    (start > 0 && start <= end).then_some(start..=end)
}

pub fn health_attempts() -> u32 {
    parsed_or("BATON_HEALTH_ATTEMPTS", DEFAULT_HEALTH_ATTEMPTS, |n| *n > 0)
}

pub fn health_interval() -> Duration {
    let default = DEFAULT_HEALTH_INTERVAL.as_millis() as u64;
    Duration::from_millis(parsed_or("BATON_HEALTH_INTERVAL_MS", default, |_| true))
}

/// Timeout for container runtime and git commands.
pub fn command_timeout() -> Duration {
    let default = DEFAULT_COMMAND_TIMEOUT.as_millis() as u64;
    Duration::from_millis(parsed_or("BATON_COMMAND_TIMEOUT_MS", default, |ms| *ms > 0))
}

/// Control plane outcomes are reported to, when configured.
pub fn control_plane_addr() -> Option<String> {
    var("BATON_CONTROL_PLANE_ADDR")
}

pub fn log_filter() -> String {
    var("BATON_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// BATON_LOG_FILE > <state_dir>/baton.log
pub fn log_file() -> Option<PathBuf> {
    var("BATON_LOG_FILE").map(PathBuf::from).or_else(|| state_dir().map(|d| d.join("baton.log")))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
