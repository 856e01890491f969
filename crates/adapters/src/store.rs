// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application-record persistence.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use baton_core::AppRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state I/O failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt record at {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid application id {0:?}")]
    InvalidKey(String),
}

/// Key/value store of application records, keyed by application id.
#[async_trait]
pub trait StateStore: Clone + Send + Sync + 'static {
    async fn get(&self, app_id: &str) -> Result<Option<AppRecord>, StoreError>;

    async fn put(&self, app_id: &str, record: &AppRecord) -> Result<(), StoreError>;

    /// Deleting an absent record succeeds.
    async fn delete(&self, app_id: &str) -> Result<(), StoreError>;

    /// All records, ordered by application id.
    async fn list(&self) -> Result<Vec<AppRecord>, StoreError>;
}

/// One JSON document per application under `<root>/apps/<app_id>.json`.
///
/// Writes go to a temp file that is renamed over the record, so a crash
/// never leaves a half-written record behind.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: Arc<PathBuf>,
}

impl FileStateStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { dir: Arc::new(root.as_ref().join("apps")) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, app_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !app_id.is_empty()
            && !app_id.starts_with('.')
            && !app_id.contains(['/', '\\', '\0']);
        if !valid {
            return Err(StoreError::InvalidKey(app_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", app_id)))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io { path: path.to_path_buf(), source }
}

async fn read_record(path: &Path) -> Result<Option<AppRecord>, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_error(path)(e)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StoreError::Corrupt { path: path.to_path_buf(), source })
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, app_id: &str) -> Result<Option<AppRecord>, StoreError> {
        read_record(&self.record_path(app_id)?).await
    }

    async fn put(&self, app_id: &str, record: &AppRecord) -> Result<(), StoreError> {
        let path = self.record_path(app_id)?;
        tokio::fs::create_dir_all(self.dir.as_path()).await.map_err(io_error(&self.dir))?;

        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|source| StoreError::Corrupt { path: path.clone(), source })?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(io_error(&tmp))?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_error(&path))?;

        tracing::debug!(app_id, path = %path.display(), "record written");
        Ok(())
    }

    async fn delete(&self, app_id: &str) -> Result<(), StoreError> {
        let path = self.record_path(app_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(app_id, "record deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    async fn list(&self) -> Result<Vec<AppRecord>, StoreError> {
        let mut entries = match tokio::fs::read_dir(self.dir.as_path()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.dir)(e)),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error(&self.dir))? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_record(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "skipping unreadable record"),
            }
        }
        records.sort_by(|a, b| a.app_id.cmp(&b.app_id));
        Ok(records)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
