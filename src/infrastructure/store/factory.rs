//! Store factory for runtime backend selection

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;

use crate::domain::store::KeyValueStore;
use crate::domain::DomainError;

use super::file::FileStore;
use super::in_memory::InMemoryStore;
use super::redis::{RedisStore, RedisStoreConfig};

/// File name of the announcements document in the data directory
pub const ANNOUNCEMENTS_FILE_NAME: &str = "feature-announcements.json";

/// File name of the variation assignments document in the data directory
pub const ASSIGNMENTS_FILE_NAME: &str = "ab-test-variations.json";

/// Supported store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Process-lifetime moka store
    #[serde(alias = "memory")]
    InMemory,
    /// JSON document on disk
    #[default]
    File,
    /// Shared Redis instance
    Redis,
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreType::InMemory => write!(f, "in_memory"),
            StoreType::File => write!(f, "file"),
            StoreType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for StoreType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(StoreType::InMemory),
            "file" => Ok(StoreType::File),
            "redis" => Ok(StoreType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown store type: {}. Valid types: in_memory, file, redis",
                s
            ))),
        }
    }
}

/// Configuration for store creation
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreType,
    /// Directory holding the file backend's documents
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Redis URL (required for the redis backend)
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Key prefix for the redis backend
    #[serde(default)]
    pub key_prefix: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreType::default(),
            data_dir: default_data_dir(),
            redis_url: None,
            key_prefix: None,
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            backend: StoreType::InMemory,
            ..Default::default()
        }
    }

    pub fn file(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: StoreType::File,
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: StoreType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// Stores backing the two caches
///
/// The file backend keeps announcements and assignments in separate
/// documents so resetting one never rewrites the other.
#[derive(Debug, Clone)]
pub struct Stores {
    pub announcements: Arc<dyn KeyValueStore>,
    pub assignments: Arc<dyn KeyValueStore>,
}

/// Factory for creating store instances
#[derive(Debug, Default)]
pub struct StoreFactory;

impl StoreFactory {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(&self, config: &StoreConfig) -> Result<Stores, DomainError> {
        match config.backend {
            StoreType::InMemory => {
                let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());

                Ok(Stores {
                    announcements: store.clone(),
                    assignments: store,
                })
            }
            StoreType::File => Ok(Stores {
                announcements: Arc::new(FileStore::new(
                    config.data_dir.join(ANNOUNCEMENTS_FILE_NAME),
                )),
                assignments: Arc::new(FileStore::new(config.data_dir.join(ASSIGNMENTS_FILE_NAME))),
            }),
            StoreType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("Redis URL is required for redis store type")
                })?;

                let mut redis_config = RedisStoreConfig::new(url);

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                let store: Arc<dyn KeyValueStore> = Arc::new(RedisStore::new(redis_config).await?);

                Ok(Stores {
                    announcements: store.clone(),
                    assignments: store,
                })
            }
        }
    }
}
