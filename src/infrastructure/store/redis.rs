//! Redis store implementation

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::store::KeyValueStore;
use crate::domain::DomainError;

/// Configuration for Redis store
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
        }
    }
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// Redis-backed store for identities shared across processes
///
/// Keys never expire. `set_if_absent` maps to `SET NX`, so concurrent first
/// assignments resolve to a single winner.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStore {
    pub async fn new(config: RedisStoreConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::storage(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    fn prefix_key(&self, key: &str) -> String {
        namespaced(self.config.key_prefix.as_deref(), key)
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        let mut conn = self.connection.clone();
        let mut cursor = 0u64;
        let mut found = Vec::new();

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to scan keys '{}': {}", pattern, e))
                })?;

            found.extend(keys);
            cursor = new_cursor;

            if cursor == 0 {
                break;
            }
        }

        Ok(found)
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<usize, DomainError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection.clone();
        let deleted: usize = conn
            .del(keys)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete keys: {}", e)))?;

        Ok(deleted)
    }
}

fn namespaced(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, key),
        None => key.to_string(),
    }
}

/// Escapes glob metacharacters so a literal prefix can be used with MATCH
fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());

    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection.clone();

        conn.get(self.prefix_key(key))
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get key '{}': {}", key, e)))
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: () = conn
            .set(self.prefix_key(key), value)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn set_if_absent_raw(&self, key: &str, value: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        // "OK" when written, nil when the key already existed
        let result: Option<String> = redis::cmd("SET")
            .arg(self.prefix_key(key))
            .arg(value)
            .arg("NX")
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to set_if_absent key '{}': {}", key, e))
            })?;

        Ok(result.is_some())
    }

    async fn remove(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        let deleted: i32 = conn
            .del(self.prefix_key(key))
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete key '{}': {}", key, e)))?;

        Ok(deleted > 0)
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        let pattern = format!("{}*", escape_glob(&self.prefix_key(prefix)));
        let keys = self.scan(&pattern).await?;

        self.delete_keys(&keys).await
    }

    async fn contains(&self, key: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();

        conn.exists(self.prefix_key(key)).await.map_err(|e| {
            DomainError::storage(format!("Failed to check existence of key '{}': {}", key, e))
        })
    }

    async fn clear(&self) -> Result<(), DomainError> {
        // Without a prefix the whole logical database belongs to this store
        match &self.config.key_prefix {
            Some(_) => {
                self.remove_prefix("").await?;
            }
            None => {
                let mut conn = self.connection.clone();
                redis::cmd("FLUSHDB")
                    .query_async::<()>(&mut conn)
                    .await
                    .map_err(|e| {
                        DomainError::storage(format!("Failed to flush database: {}", e))
                    })?;
            }
        }

        Ok(())
    }

    async fn len(&self) -> Result<usize, DomainError> {
        match &self.config.key_prefix {
            Some(_) => {
                let pattern = format!("{}*", escape_glob(&self.prefix_key("")));
                Ok(self.scan(&pattern).await?.len())
            }
            None => {
                let mut conn = self.connection.clone();
                redis::cmd("DBSIZE")
                    .query_async::<usize>(&mut conn)
                    .await
                    .map_err(|e| DomainError::storage(format!("Failed to get DB size: {}", e)))
            }
        }
    }
}
