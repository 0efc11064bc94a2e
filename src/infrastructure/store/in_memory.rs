//! In-memory store implementation using moka

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use crate::domain::store::KeyValueStore;
use crate::domain::DomainError;

/// Thread-safe in-memory store
///
/// No capacity bound and no expiry, so entries live until removed or the
/// process exits. Used for ephemeral runs and as a test double.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    entries: MokaCache<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            entries: MokaCache::builder().build(),
        }
    }

    /// Creates a store pre-populated with raw JSON entries
    pub async fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();

        for (key, value) in entries {
            store.entries.insert(key.into(), value.into()).await;
        }

        store
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.entries.get(key).await)
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.entries.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn set_if_absent_raw(&self, key: &str, value: &str) -> Result<bool, DomainError> {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert(value.to_string())
            .await;

        Ok(entry.is_fresh())
    }

    async fn remove(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.entries.remove(key).await.is_some())
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        self.entries.run_pending_tasks().await;

        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.to_string())
            .collect();

        let mut removed = 0;

        for key in keys {
            if self.entries.remove(&key).await.is_some() {
                removed += 1;
            }
        }

        Ok(removed)
    }

    async fn contains(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.entries.contains_key(key))
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
        Ok(())
    }

    async fn len(&self) -> Result<usize, DomainError> {
        self.entries.run_pending_tasks().await;
        Ok(self.entries.entry_count() as usize)
    }
}
