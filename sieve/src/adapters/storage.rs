//! Key-value storage persistence.
//!
//! The whole filter set lives under one storage key as a JSON array:
//!
//! ```json
//! [{"key": "status", "encodedValue": "active"}, {"key": "price", "encodedValue": "10|"}]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::config::{Config, DEFAULT_STORAGE_KEY};
use crate::schema::{ActiveFilter, FilterDefinition};
use crate::{Error, Result};

use super::atomic;
use super::{restore_filters, PersistenceAdapter};

/// String key-value store, the shape of browser local storage.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// One file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    pub fn item_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.json", key)))
    }
}

/// Keys become file names, so keep them to a safe alphabet.
fn validate_key(key: &str) -> Result<()> {
    let safe = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if safe {
        Ok(())
    } else {
        Err(Error::InvalidStorageKey(key.to_string()))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.item_path(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.item_path(key)?;
        fs::create_dir_all(&self.root)?;
        atomic::replace_file(&path, value.as_bytes())?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.item_path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// One persisted filter: its key and codec token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFilter {
    pub key: String,
    pub encoded_value: String,
}

/// Persists the filter set as one JSON entry in a [`Storage`].
#[derive(Debug, Clone)]
pub struct StorageAdapter<S: Storage> {
    storage: S,
    storage_key: String,
}

impl<S: Storage> StorageAdapter<S> {
    pub fn new(storage: S, storage_key: impl Into<String>) -> Self {
        Self {
            storage,
            storage_key: storage_key.into(),
        }
    }

    /// Use the default storage key.
    pub fn with_default_key(storage: S) -> Self {
        Self::new(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

impl StorageAdapter<FileStorage> {
    /// File-backed adapter under the configured storage directory and key.
    pub fn from_config(config: &Config) -> Self {
        Self::new(FileStorage::new(config.storage_dir()), config.storage_key.clone())
    }
}

impl<S: Storage> PersistenceAdapter for StorageAdapter<S> {
    fn save_filters(&mut self, filters: &[ActiveFilter]) -> Result<()> {
        let stored: Vec<StoredFilter> = filters
            .iter()
            .map(|filter| StoredFilter {
                key: filter.key().to_string(),
                encoded_value: codec::encode(filter.value()),
            })
            .collect();
        let json = serde_json::to_string(&stored)?;
        self.storage.set_item(&self.storage_key, &json)
    }

    fn load_filters(&mut self, available: &[FilterDefinition]) -> Result<Vec<ActiveFilter>> {
        let Some(json) = self.storage.get_item(&self.storage_key)? else {
            return Ok(Vec::new());
        };
        let stored: Vec<StoredFilter> = serde_json::from_str(&json)?;
        let entries = stored
            .iter()
            .map(|s| (s.key.as_str(), s.encoded_value.as_str()));
        Ok(restore_filters(entries, available))
    }

    fn clear_filters(&mut self) -> Result<()> {
        self.storage.remove_item(&self.storage_key)
    }
}
