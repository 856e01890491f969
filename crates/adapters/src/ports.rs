// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream port allocation.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortError {
    #[error("no free port in {start}-{end}")]
    Exhausted { start: u16, end: u16 },
    #[error("port allocation failed: {0}")]
    Unavailable(String),
}

/// Hands out upstream ports for new containers.
#[async_trait]
pub trait PortAllocator: Clone + Send + Sync + 'static {
    async fn allocate(&self) -> Result<u16, PortError>;

    /// Return a port to the pool. Releasing a port that is not held succeeds.
    async fn release(&self, port: u16) -> Result<(), PortError>;
}

/// Allocates the lowest free port of an inclusive range on this host.
///
/// A port is free when this allocator does not hold it and nothing else on
/// the host is bound to it.
#[derive(Debug, Clone)]
pub struct LocalPortAllocator {
    range: RangeInclusive<u16>,
    host: String,
    held: Arc<Mutex<BTreeSet<u16>>>,
}

impl LocalPortAllocator {
    pub fn new(range: RangeInclusive<u16>, host: impl Into<String>) -> Self {
        Self { range, host: host.into(), held: Arc::new(Mutex::new(BTreeSet::new())) }
    }

    /// Mark a port as held, e.g. one recorded by a live application.
    pub fn reserve(&self, port: u16) {
        self.held.lock().insert(port);
    }

    pub fn held(&self) -> Vec<u16> {
        self.held.lock().iter().copied().collect()
    }

    async fn bindable(&self, port: u16) -> bool {
        TcpListener::bind((self.host.as_str(), port)).await.is_ok()
    }
}

#[async_trait]
impl PortAllocator for LocalPortAllocator {
    async fn allocate(&self) -> Result<u16, PortError> {
        for port in self.range.clone() {
            if self.held.lock().contains(&port) {
                continue;
            }
            if !self.bindable(port).await {
                tracing::debug!(port, "port in use by another process");
                continue;
            }
            // A concurrent allocation may have claimed it during the probe
            if self.held.lock().insert(port) {
                tracing::info!(port, "port allocated");
                return Ok(port);
            }
        }
        Err(PortError::Exhausted { start: *self.range.start(), end: *self.range.end() })
    }

    async fn release(&self, port: u16) -> Result<(), PortError> {
        if self.held.lock().remove(&port) {
            tracing::info!(port, "port released");
        } else {
            tracing::debug!(port, "released port was not held");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "ports_tests.rs"]
mod tests;
