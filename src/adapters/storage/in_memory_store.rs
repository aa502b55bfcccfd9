//! In-Memory Key/Value Store Adapter
//!
//! Stores values in memory. Useful for testing and development.
//! An optional byte quota simulates a full browser-style local store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{KeyValueStore, StorageError, StorageKey};

/// In-memory key/value store
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Arc<RwLock<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
    reject_writes: Arc<AtomicBool>,
}

impl InMemoryKeyValueStore {
    /// Create a new unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses writes once keys plus values exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// Make every subsequent write fail with `Unavailable` (or succeed again)
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Seed a raw value, bypassing quota checks
    pub async fn insert_raw(&self, key: &StorageKey, value: impl Into<String>) {
        self.values.write().await.insert(key.as_key(), value.into());
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.values.write().await.clear();
    }

    /// Get the number of stored values
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    pub async fn contains(&self, key: &StorageKey) -> bool {
        self.values.read().await.contains_key(&key.as_key())
    }

    fn used_bytes(values: &HashMap<String, String>, skip: &str) -> usize {
        values
            .iter()
            .filter(|(k, _)| k.as_str() != skip)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().await.get(&key.as_key()).cloned())
    }

    async fn set(&self, key: &StorageKey, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes are disabled".to_string()));
        }

        let key = key.as_key();
        let mut values = self.values.write().await;

        if let Some(quota) = self.quota_bytes {
            let used = Self::used_bytes(&values, &key);
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(used);
            if needed > available {
                return Err(StorageError::QuotaExceeded { needed, available });
            }
        }

        values.insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &StorageKey) -> Result<(), StorageError> {
        self.values.write().await.remove(&key.as_key());
        Ok(())
    }
}
