//! Single-document JSON file store

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::store::KeyValueStore;
use crate::domain::DomainError;

type Document = BTreeMap<String, Value>;

/// Store persisted as one JSON object at a fixed path
///
/// A missing file is an empty store. Every mutation is a read-modify-write
/// of the whole document under an async mutex, written to a sibling temp
/// file and renamed into place. Reads of a corrupt file fail, while the next
/// mutation starts over from an empty document and replaces it.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn load(&self) -> Result<Document, DomainError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::serialization(format!("Corrupt store file {}: {}", self.path.display(), e))
        })
    }

    async fn persist(&self, document: &Document) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let data = serde_json::to_vec_pretty(document)
            .map_err(|e| DomainError::serialization(format!("Failed to encode store: {}", e)))?;

        let temp = self.temp_path();

        tokio::fs::write(&temp, data).await.map_err(|e| {
            DomainError::storage(format!("Failed to write {}: {}", temp.display(), e))
        })?;

        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to move {} into place: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Applies `f` to the document, persisting when it reports a change or
    /// when the file on disk had to be discarded
    async fn mutate<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut Document) -> Result<(T, bool), DomainError>,
    {
        let _guard = self.lock.lock().await;

        let (mut document, repaired) = match self.load().await {
            Ok(document) => (document, false),
            Err(DomainError::Serialization { message }) => {
                warn!(
                    path = %self.path.display(),
                    error = %message,
                    "Replacing corrupt store file"
                );
                (Document::new(), true)
            }
            Err(e) => return Err(e),
        };

        let (result, changed) = f(&mut document)?;

        if changed || repaired {
            self.persist(&document).await?;
        }

        Ok(result)
    }
}

fn parse_value(key: &str, value: &str) -> Result<Value, DomainError> {
    serde_json::from_str(value).map_err(|e| {
        DomainError::serialization(format!("Value for '{}' is not valid JSON: {}", key, e))
    })
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let _guard = self.lock.lock().await;
        let document = self.load().await?;

        Ok(document.get(key).map(Value::to_string))
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let value = parse_value(key, value)?;

        self.mutate(|document| {
            document.insert(key.to_string(), value);
            Ok(((), true))
        })
        .await
    }

    async fn set_if_absent_raw(&self, key: &str, value: &str) -> Result<bool, DomainError> {
        let value = parse_value(key, value)?;

        self.mutate(|document| {
            if document.contains_key(key) {
                return Ok((false, false));
            }

            document.insert(key.to_string(), value);
            Ok((true, true))
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<bool, DomainError> {
        self.mutate(|document| {
            let existed = document.remove(key).is_some();
            Ok((existed, existed))
        })
        .await
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<usize, DomainError> {
        self.mutate(|document| {
            let before = document.len();
            document.retain(|k, _| !k.starts_with(prefix));
            let removed = before - document.len();
            Ok((removed, removed > 0))
        })
        .await
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.mutate(|document| {
            let changed = !document.is_empty();
            document.clear();
            Ok(((), changed))
        })
        .await
    }

    async fn len(&self) -> Result<usize, DomainError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.len())
    }
}
