//! Key-value store abstraction
//!
//! Every record the application keeps lives in a flat key space of JSON
//! documents. The only query primitive is a prefix scan, so key layout is
//! what gives the data its shape (`user:{id}`, `lesson:{student}:{id}`, ...).

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::error::StoreResult;

/// A single key/value pair returned by a prefix scan
#[derive(Debug, Clone, PartialEq)]
pub struct KvEntry {
    pub key: String,
    pub value: Value,
}

/// Generic get/set/delete/prefix-scan interface over JSON documents
///
/// Implementations give no atomicity across calls: a read followed by a
/// write can interleave with any other caller.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get a value by key
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Insert or overwrite a value
    async fn set(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Return every entry whose key starts with `prefix`, ordered by key
    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<KvEntry>>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}

/// Read a key and deserialize it into `T`
pub async fn get_as<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> StoreResult<Option<T>> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize `value` and write it under `key`
pub async fn set_as<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> StoreResult<()> {
    store.set(key, serde_json::to_value(value)?).await
}

/// In-process store backed by an ordered map
///
/// Used for development and tests. The lock only keeps the map memory-safe;
/// it does not make read-modify-write sequences atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the store holds no keys
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<KvEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| KvEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
