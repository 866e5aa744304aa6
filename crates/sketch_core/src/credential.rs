//! The single API key slot
//!
//! One credential per store. It is kept as plain text and only checked for shape: the
//! remote service is the one that decides whether it is actually valid.

use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::storage::KeyValueStore;

/// Storage slot holding the raw key.
pub const CREDENTIAL_KEY: &str = "openai_api_key";

/// Conventional prefix of OpenAI secret keys.
pub const CREDENTIAL_PREFIX: &str = "sk-";

#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Validate and persist `value`, replacing any previous key.
    pub async fn set(&self, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(CoreError::Validation(
                "Please enter a valid OpenAI API key".to_string(),
            ));
        }

        if !value.starts_with(CREDENTIAL_PREFIX) {
            return Err(CoreError::Validation(format!(
                "OpenAI API keys typically start with '{}'",
                CREDENTIAL_PREFIX
            )));
        }

        self.storage.set(CREDENTIAL_KEY, value).await?;
        tracing::info!("API key saved");
        Ok(())
    }

    /// Current key, if any. Read failures are logged and reported as absent.
    pub async fn get(&self) -> Option<String> {
        match self.storage.get(CREDENTIAL_KEY).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read API key: {}", e);
                None
            }
        }
    }

    /// Remove the key. Calling it with nothing stored is fine.
    pub async fn clear(&self) -> Result<()> {
        if self.storage.remove(CREDENTIAL_KEY).await? {
            tracing::info!("API key removed");
        }
        Ok(())
    }

    pub async fn is_configured(&self) -> bool {
        self.get().await.is_some()
    }

    /// Display form of the stored key, e.g. `sk-...c123`.
    pub async fn masked(&self) -> Option<String> {
        self.get().await.map(|key| mask_key(&key))
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
    use tempfile::tempdir;

    fn memory_store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryKeyValueStore::new()))
    }

    #[tokio::test]
    async fn set_rejects_key_without_prefix() {
        let store = memory_store();

        let result = store.set("not-a-key").await;

        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn set_rejects_empty_key() {
        let store = memory_store();

        assert!(matches!(store.set("").await, Err(CoreError::Validation(_))));
        assert!(matches!(store.set("   ").await, Err(CoreError::Validation(_))));
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn set_then_get_returns_key() {
        let store = memory_store();

        store.set("sk-abc123").await.unwrap();

        assert_eq!(store.get().await.as_deref(), Some("sk-abc123"));
        assert!(store.is_configured().await);
    }

    #[tokio::test]
    async fn set_overwrites_previous_key() {
        let store = memory_store();

        store.set("sk-first").await.unwrap();
        store.set("sk-second").await.unwrap();

        assert_eq!(store.get().await.as_deref(), Some("sk-second"));
    }

    #[tokio::test]
    async fn invalid_set_keeps_previous_key() {
        let store = memory_store();

        store.set("sk-first").await.unwrap();
        assert!(store.set("bogus").await.is_err());

        assert_eq!(store.get().await.as_deref(), Some("sk-first"));
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = memory_store();

        store.set("sk-abc123").await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(store.get().await.is_none());
        assert!(!store.is_configured().await);
    }

    #[tokio::test]
    async fn key_survives_new_store_instance() {
        let dir = tempdir().unwrap();
        let first = CredentialStore::new(Arc::new(FileKeyValueStore::new(dir.path())));
        first.set("sk-persisted").await.unwrap();

        let second = CredentialStore::new(Arc::new(FileKeyValueStore::new(dir.path())));

        assert_eq!(second.get().await.as_deref(), Some("sk-persisted"));
    }

    #[tokio::test]
    async fn empty_slot_counts_as_absent() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        storage.set(CREDENTIAL_KEY, "").await.unwrap();
        let store = CredentialStore::new(storage);

        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn masked_hides_middle_of_key() {
        let store = memory_store();
        store.set("sk-abcdef123456").await.unwrap();

        assert_eq!(store.masked().await.as_deref(), Some("sk-...3456"));
    }

    #[test]
    fn mask_key_short_values_fully_hidden() {
        assert_eq!(mask_key("sk-abc"), "******");
    }
}
