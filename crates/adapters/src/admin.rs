// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reverse-proxy admin API client.
//!
//! Routes are addressed by their `@id`, so replacing or deleting one never
//! depends on its index in the server's route list.

use std::time::Duration;

use async_trait::async_trait;
use baton_core::{Route, RouteError};
use thiserror::Error;

use crate::http::{self, HttpError, Response};

pub const DEFAULT_ADMIN_ADDR: &str = "127.0.0.1:2019";
pub const DEFAULT_SERVER: &str = "srv0";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("invalid route payload: {0}")]
    Route(#[from] RouteError),
    #[error("invalid JSON from admin API: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Publishes and retracts routes on the reverse proxy.
#[async_trait]
pub trait RouteClient: Clone + Send + Sync + 'static {
    /// Create the route, or replace the one with the same id.
    async fn add_route(&self, route: &Route) -> Result<(), AdminError>;

    /// Delete a route by id. Deleting a missing route succeeds.
    async fn remove_route(&self, route_id: &str) -> Result<(), AdminError>;

    async fn get_route(&self, route_id: &str) -> Result<Option<Route>, AdminError>;
}

/// Admin API client for a Caddy-compatible proxy.
#[derive(Debug, Clone)]
pub struct AdminClient {
    addr: String,
    server: String,
    upstream_host: String,
    timeout: Duration,
}

impl AdminClient {
    pub fn new(addr: impl Into<String>, upstream_host: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            server: DEFAULT_SERVER.to_string(),
            upstream_host: upstream_host.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Server block that new routes are appended to.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(&self, method: &str, path: &str, body: Option<&str>) -> Result<Response, AdminError> {
        Ok(http::request(&self.addr, method, path, body, self.timeout).await?)
    }
}

#[async_trait]
impl RouteClient for AdminClient {
    async fn add_route(&self, route: &Route) -> Result<(), AdminError> {
        let body = serde_json::to_string(&route.to_wire(&self.upstream_host))?;

        let replaced = self.send("PATCH", &format!("/id/{}", route.id), Some(&body)).await?;
        if replaced.status != 404 {
            replaced.error_for_status()?;
            tracing::info!(route = %route.id, port = route.port, "route replaced");
            return Ok(());
        }

        let path = format!("/config/apps/http/servers/{}/routes", self.server);
        self.send("POST", &path, Some(&body)).await?.error_for_status()?;
        tracing::info!(route = %route.id, port = route.port, "route created");
        Ok(())
    }

    async fn remove_route(&self, route_id: &str) -> Result<(), AdminError> {
        let response = self.send("DELETE", &format!("/id/{}", route_id), None).await?;
        if response.status == 404 {
            tracing::debug!(route = %route_id, "route already absent");
            return Ok(());
        }
        response.error_for_status()?;
        tracing::info!(route = %route_id, "route removed");
        Ok(())
    }

    async fn get_route(&self, route_id: &str) -> Result<Option<Route>, AdminError> {
        let response = self.send("GET", &format!("/id/{}", route_id), None).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        let value: serde_json::Value = serde_json::from_str(&response.body)?;
        Ok(Some(Route::from_wire(value)?))
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
