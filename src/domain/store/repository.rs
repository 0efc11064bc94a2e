//! Key-value store trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Durable key-value store without expiry
///
/// Values are JSON strings so the trait stays dyn-compatible; use
/// [`KeyValueStoreExt`] for typed access. A missing key is `Ok(None)`,
/// never an error. Write failures are always returned to the caller.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Gets a raw JSON value
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value, replacing any previous value
    async fn set_raw(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Sets a value only if the key is absent, returning whether it was written
    ///
    /// Implementations backed by a shared medium should override this with an
    /// atomic operation.
    async fn set_if_absent_raw(&self, key: &str, value: &str) -> Result<bool, DomainError> {
        if self.contains(key).await? {
            Ok(false)
        } else {
            self.set_raw(key, value).await?;
            Ok(true)
        }
    }

    /// Removes a key, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool, DomainError>;

    /// Removes every key starting with `prefix`, returning how many were removed
    async fn remove_prefix(&self, prefix: &str) -> Result<usize, DomainError>;

    /// Checks whether a key is present
    async fn contains(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key).await?.is_some())
    }

    /// Removes every entry
    async fn clear(&self) -> Result<(), DomainError>;

    /// Number of stored entries
    async fn len(&self) -> Result<usize, DomainError>;
}

/// Typed get/set on top of [`KeyValueStore`]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Gets a typed value
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::serialization(format!(
                            "Failed to deserialize value for '{}': {}",
                            key, e
                        ))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = encode(key, value)?;
            self.set_raw(key, &data).await
        }
    }

    /// Sets a typed value only if the key is absent
    fn set_if_absent<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
    ) -> impl std::future::Future<Output = Result<bool, DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = encode(key, value)?;
            self.set_if_absent_raw(key, &data).await
        }
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStoreExt for T {}

fn encode<V: Serialize>(key: &str, value: &V) -> Result<String, DomainError> {
    serde_json::to_string(value).map_err(|e| {
        DomainError::serialization(format!("Failed to serialize value for '{}': {}", key, e))
    })
}
