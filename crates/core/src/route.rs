// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Published hostname → upstream binding and its reverse-proxy wire format.
//!
//! On the wire a route is a Caddy-style route object:
//!
//! ```json
//! {
//!   "@id": "web-route",
//!   "match": [{ "host": ["a.example.com"] }],
//!   "handle": [{ "handler": "reverse_proxy", "upstreams": [{ "dial": "127.0.0.1:10001" }] }],
//!   "terminal": true
//! }
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

const REVERSE_PROXY: &str = "reverse_proxy";

/// Trailing `:<digits>` of an upstream dial string.
#[allow(clippy::expect_used)]
static DIAL_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\d+)$").expect("constant regex pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("malformed route: {0}")]
    Malformed(String),
    #[error("route {route_id} has no reverse_proxy upstream")]
    NoUpstream { route_id: String },
    #[error("upstream dial {0:?} does not end in :<port>")]
    MissingPort(String),
    #[error("upstream dial {0:?} has an out-of-range port")]
    InvalidPort(String),
}

/// A published route: stable id, matched hostnames, and upstream port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub domains: Vec<String>,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireRoute {
    #[serde(rename = "@id", default)]
    id: String,
    #[serde(rename = "match", default)]
    matchers: Vec<WireMatch>,
    #[serde(default)]
    handle: Vec<WireHandler>,
    #[serde(default)]
    terminal: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMatch {
    #[serde(default)]
    host: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireHandler {
    handler: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    upstreams: Vec<WireUpstream>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireUpstream {
    dial: String,
}

impl Route {
    pub fn new(id: impl Into<String>, domains: Vec<String>, port: u16) -> Self {
        Self { id: id.into(), domains, port }
    }

    /// Encode as a reverse-proxy route whose single upstream is `host:port`.
    pub fn to_wire(&self, upstream_host: &str) -> serde_json::Value {
        let wire = WireRoute {
            id: self.id.clone(),
            matchers: vec![WireMatch { host: self.domains.clone() }],
            handle: vec![WireHandler {
                handler: REVERSE_PROXY.to_string(),
                upstreams: vec![WireUpstream { dial: format!("{}:{}", upstream_host, self.port) }],
            }],
            terminal: true,
        };
        serde_json::to_value(wire).unwrap_or(serde_json::Value::Null)
    }

    /// Decode a route object returned by the admin API.
    pub fn from_wire(value: serde_json::Value) -> Result<Self, RouteError> {
        let wire: WireRoute =
            serde_json::from_value(value).map_err(|e| RouteError::Malformed(e.to_string()))?;
        let dial = wire
            .handle
            .iter()
            .filter(|h| h.handler == REVERSE_PROXY)
            .flat_map(|h| h.upstreams.iter())
            .map(|u| u.dial.as_str())
            .next()
            .ok_or_else(|| RouteError::NoUpstream { route_id: wire.id.clone() })?;
        let port = parse_dial_port(dial)?;
        let domains = wire.matchers.into_iter().flat_map(|m| m.host).collect();
        Ok(Self { id: wire.id, domains, port })
    }
}

/// Extract the port from a dial string such as `127.0.0.1:10001` or `[::1]:80`.
pub fn parse_dial_port(dial: &str) -> Result<u16, RouteError> {
    let digits = DIAL_PORT
        .captures(dial)
        .and_then(|c| c.get(1))
        .ok_or_else(|| RouteError::MissingPort(dial.to_string()))?;
    digits.as_str().parse::<u16>().map_err(|_| RouteError::InvalidPort(dial.to_string()))
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
