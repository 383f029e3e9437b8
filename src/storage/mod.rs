//! Blob storage for desk state
//!
//! ## Table of Contents
//! - **BlobStore**: Trait for key/value backends holding serialized records
//! - **MemoryStore**: In-memory store for tests and ephemeral runs
//! - **FileStore**: Single JSON file, written through on every change
//! - **records**: The records the desk persists, plus the case history log

pub mod records;

pub use records::{ActiveSessionPayload, CaseHistory, CaseLog};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Keys for the records the desk persists
pub mod keys {
    pub const ECONOMY: &str = "economy.state";
    pub const ACTIVE_SESSION: &str = "session.active";
    pub const CASE_HISTORY: &str = "history.logs";
}

/// Errors raised by storage backends
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Trait for blob storage backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Get a value by key
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Set a value
    async fn set(&self, key: &str, value: String) -> StorageResult<()>;

    /// Delete a key
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Store name for logging
    fn name(&self) -> &str;
}

/// Get and deserialize JSON from the store
pub async fn get_json<T: DeserializeOwned>(store: &dyn BlobStore, key: &str) -> StorageResult<Option<T>> {
    match store.get(key).await? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

/// Serialize and set JSON in the store
pub async fn set_json<T: Serialize>(store: &dyn BlobStore, key: &str, value: &T) -> StorageResult<()> {
    let text = serde_json::to_string(value)?;
    store.set(key, text).await
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        let mut data = self.data.write().await;
        data.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut data = self.data.write().await;
        data.remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// File-based persistent storage
///
/// All keys live in one JSON object on disk. Every `set` and `delete`
/// rewrites the file. A file that cannot be parsed is treated as empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open or create a file store
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        let data: BTreeMap<String, String> = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Store file unreadable, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), keys = data.len(), "File store opened");

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, data: &BTreeMap<String, String>) -> StorageResult<()> {
        let contents = serde_json::to_string_pretty(data)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Replace the file in one rename so a crash never leaves it half written
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, contents).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!(path = %self.path.display(), "File store flushed");
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> StorageResult<()> {
        let mut data = self.data.write().await;
        data.insert(key.to_string(), value);
        self.flush(&data).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut data = self.data.write().await;
        if data.remove(key).is_some() {
            self.flush(&data).await?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Type alias for a shared store
pub type SharedStore = Arc<dyn BlobStore>;

/// Create a memory store
pub fn memory_store() -> SharedStore {
    Arc::new(MemoryStore::new()) as SharedStore
}
