//! Sipa State
//!
//! Session and local key/value storage for component data. Values go
//! through the sipa codec, so dates, regular expressions, functions and
//! the other non-JSON values survive a round trip. Local storage keeps a
//! JSON object of key to stored string on disk.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sipa_codec::{deserialize, to_storage_string, CodecError, Value};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storage file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("storage file {path} is not a JSON object of strings: {source}")]
    Format { path: PathBuf, source: serde_json::Error },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Storage backend
#[derive(Debug, Default)]
pub struct Storage {
    data: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl Storage {
    /// Create in-memory storage (sessionStorage)
    pub fn session() -> Self {
        Self::default()
    }

    /// Create persistent storage (localStorage) backed by `path`.
    /// A missing file starts out empty.
    pub fn local(path: impl Into<PathBuf>) -> Result<Self, StateError> {
        let path = path.into();
        let data = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StateError::Io {
                path: path.clone(),
                source,
            })?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|source| StateError::Format {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };
        tracing::debug!("loaded {} key(s) from {}", data.len(), path.display());

        Ok(Self {
            data,
            path: Some(path),
        })
    }

    /// Backing file, `None` for session storage
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }

    /// Store a value in its serialized form
    pub fn set(&mut self, key: &str, value: &Value) -> Result<(), StateError> {
        let stored = to_storage_string(value)?;
        self.set_item(key, &stored)
    }

    /// Read a value back. Unknown keys are `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_item(key).map(deserialize)
    }

    /// Raw stored string
    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|s| s.as_str())
    }

    /// Store a raw string
    pub fn set_item(&mut self, key: &str, value: &str) -> Result<(), StateError> {
        self.data.insert(key.to_string(), value.to_string());
        self.persist()
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, StateError> {
        let removed = self.data.remove(key).map(|s| deserialize(&s));
        self.persist()?;
        Ok(removed)
    }

    /// Clear all items
    pub fn clear(&mut self) -> Result<(), StateError> {
        self.data.clear();
        self.persist()
    }

    /// Get key at index, in key order
    pub fn key(&self, index: usize) -> Option<&str> {
        self.data.keys().nth(index).map(|s| s.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Persist to disk if persistent
    fn persist(&self) -> Result<(), StateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let contents = serde_json::to_string_pretty(&self.data).map_err(|source| StateError::Format {
            path: path.clone(),
            source,
        })?;
        fs::write(path, contents).map_err(|source| StateError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::trace!("persisted {} key(s) to {}", self.data.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sipa_codec::Map;

    #[test]
    fn test_session_round_trip() {
        let mut storage = Storage::session();
        let value = Value::Object(
            [("n", Value::Number(f64::NAN)), ("missing", Value::Undefined)]
                .into_iter()
                .collect::<Map>(),
        );
        storage.set("state", &value).unwrap();

        assert_eq!(storage.get("state"), Some(value));
        assert_eq!(storage.get("other"), None);
        assert!(!storage.is_persistent());
    }

    #[test]
    fn test_null_is_stored_as_json_null() {
        let mut storage = Storage::session();
        storage.set("nothing", &Value::Null).unwrap();
        assert_eq!(storage.get_item("nothing"), Some("null"));
        assert_eq!(storage.get("nothing"), Some(Value::Null));
    }

    #[test]
    fn test_keys_and_remove() {
        let mut storage = Storage::session();
        storage.set("b", &Value::from(2)).unwrap();
        storage.set("a", &Value::from(1)).unwrap();

        assert_eq!(storage.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(storage.key(1), Some("b"));
        assert_eq!(storage.remove("a").unwrap(), Some(Value::from(1)));
        assert_eq!(storage.len(), 1);

        storage.clear().unwrap();
        assert!(storage.is_empty());
    }
}
