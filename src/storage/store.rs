//! Key-value store abstraction and the in-memory backend

use std::collections::HashMap;
use std::hash::Hash;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode cache record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode cache record: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("record key {found:?} does not match store key {expected:?}")]
    KeyMismatch { expected: String, found: String },

    #[error("cache store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// A durable or in-memory map. Each call is atomic with respect to other calls.
pub trait KeyValueStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Result<Option<V>, StoreError>;

    /// Insert or overwrite
    fn put(&self, key: K, value: V) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

impl<K, V, S> KeyValueStore<K, V> for Arc<S>
where
    S: KeyValueStore<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: K, value: V) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// Process-local store
#[derive(Debug)]
pub struct MemoryStore<K, V> {
    entries: Mutex<HashMap<K, V>>,
}

impl<K, V> MemoryStore<K, V> {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

impl<K, V> Default for MemoryStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> KeyValueStore<K, V> for MemoryStore<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key, value);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_put_overwrites_and_clear_empties() {
        let store: MemoryStore<String, u32> = MemoryStore::new();
        store.put("a".to_string(), 1).unwrap();
        store.put("a".to_string(), 2).unwrap();

        assert_eq!(store.get(&"a".to_string()).unwrap(), Some(2));
        assert_eq!(store.get(&"b".to_string()).unwrap(), None);

        store.clear().unwrap();
        assert_eq!(store.get(&"a".to_string()).unwrap(), None);
    }
}
