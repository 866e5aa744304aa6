//! Key-value storage trait and implementations
//!
//! Every piece of local state is a single string-valued slot addressed by a fixed key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;

use crate::error::Result;

/// String-valued slot storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a slot, `None` when it was never written or has been removed
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the slot contents
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot, returns whether anything was deleted
    async fn remove(&self, key: &str) -> Result<bool>;
}

/// File-based storage, one file per key
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.base_path).await?;

        // Write then rename so a crash never leaves a half-written slot behind
        let path = self.slot_path(key);
        let tmp = self.base_path.join(format!(".{}.tmp", key));
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        match fs::remove_file(self.slot_path(key)).await {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(error.into()),
        }
    }
}

/// In-memory storage, useful for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.slots.write().await.remove(key).is_some())
    }
}
