// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Durable per-URL baseline storage
//!
//! Callers guarantee at most one writer per key at a time; the store does no
//! locking of its own. Reads never fail: a missing or unreadable record is
//! reported as absent so the next check re-establishes the baseline.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use super::types::ContentSnapshot;

/// Keys longer than this are shortened with a hash suffix
const MAX_KEY_LEN: usize = 150;

/// Baseline write failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize baseline for {url}: {source}")]
    Serialize {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Trait for baseline storage backends
#[async_trait]
pub trait BaselineStore: Send + Sync {
    /// Most recent accepted snapshot for `url`, if any
    async fn get(&self, url: &str) -> Option<ContentSnapshot>;

    /// Replace the snapshot for `url`. Durable once this returns `Ok`.
    async fn put(&self, url: &str, snapshot: &ContentSnapshot) -> Result<(), StoreError>;

    /// Drop the snapshot for `url`. Returns whether one existed.
    async fn remove(&self, url: &str) -> Result<bool, StoreError>;
}

/// Storage key for a URL: host + path + query with unsafe characters replaced
pub fn baseline_key(url: &str) -> String {
    let raw = match Url::parse(url) {
        Ok(parsed) => format!(
            "{}{}{}",
            parsed.host_str().unwrap_or_default(),
            parsed.path(),
            parsed.query().map(|q| format!("?{}", q)).unwrap_or_default()
        ),
        Err(_) => url.to_string(),
    };

    let mut key: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if key.len() > MAX_KEY_LEN {
        let digest = hex::encode(Sha256::digest(url.as_bytes()));
        key.truncate(MAX_KEY_LEN - 17);
        key.push('_');
        key.push_str(&digest[..16]);
    }

    key
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// File-based store: one JSON record per URL under a base directory
pub struct FileBaselineStore {
    base_path: PathBuf,
}

impl FileBaselineStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the record for `url`
    pub fn record_path(&self, url: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", baseline_key(url)))
    }

    async fn ensure_base_dir(&self) -> Result<(), StoreError> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path)
                .await
                .map_err(|e| io_error(&self.base_path, e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl BaselineStore for FileBaselineStore {
    async fn get(&self, url: &str) -> Option<ContentSnapshot> {
        let path = self.record_path(url);

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No baseline at {:?}", path);
                return None;
            }
            Err(e) => {
                warn!("Failed to read baseline {:?}: {}, treating as absent", path, e);
                return None;
            }
        };

        let snapshot: ContentSnapshot = match serde_json::from_str(&contents) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Corrupt baseline {:?}: {}, treating as absent", path, e);
                return None;
            }
        };

        // Two URLs can share a key; never compare against another page's content
        if snapshot.url != url {
            warn!(
                "Baseline {:?} belongs to {}, not {}; treating as absent",
                path, snapshot.url, url
            );
            return None;
        }

        Some(snapshot)
    }

    async fn put(&self, url: &str, snapshot: &ContentSnapshot) -> Result<(), StoreError> {
        self.ensure_base_dir().await?;

        let path = self.record_path(url);
        let json = serde_json::to_string_pretty(snapshot).map_err(|source| {
            StoreError::Serialize {
                url: url.to_string(),
                source,
            }
        })?;

        // Write atomically using a temp file, then make the rename durable
        let temp_path = path.with_extension("json.tmp");
        if let Err(e) = write_and_rename(&temp_path, &path, json.as_bytes()).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                debug!("Could not remove {:?}: {}", temp_path, cleanup);
            }
            return Err(e);
        }
        sync_dir(&self.base_path).await?;

        debug!("Saved baseline for {} to {:?}", url, path);
        Ok(())
    }

    async fn remove(&self, url: &str) -> Result<bool, StoreError> {
        let path = self.record_path(url);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

async fn write_and_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = fs::File::create(temp_path)
        .await
        .map_err(|e| io_error(temp_path, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| io_error(temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| io_error(temp_path, e))?;
    drop(file);

    fs::rename(temp_path, path)
        .await
        .map_err(|e| io_error(path, e))
}

/// Flush directory metadata so a completed rename survives a crash
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    let handle = fs::File::open(dir).await.map_err(|e| io_error(dir, e))?;
    handle.sync_all().await.map_err(|e| io_error(dir, e))
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> Result<(), StoreError> {
    Ok(())
}

/// In-memory store, for tests and dry runs
#[derive(Default)]
pub struct MemoryBaselineStore {
    records: RwLock<HashMap<String, ContentSnapshot>>,
}

impl MemoryBaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl BaselineStore for MemoryBaselineStore {
    async fn get(&self, url: &str) -> Option<ContentSnapshot> {
        self.records.read().await.get(url).cloned()
    }

    async fn put(&self, url: &str, snapshot: &ContentSnapshot) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(url.to_string(), snapshot.clone());
        Ok(())
    }

    async fn remove(&self, url: &str) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(url).is_some())
    }
}
