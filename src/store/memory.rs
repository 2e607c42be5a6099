//! Memory Store Module
//!
//! In-process store with per-entry TTL, for tests, single-process apps and
//! local development.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::StoreResult;
use crate::store::{KeyValueStore, StoreEntry};

// == Memory Store ==
/// HashMap-backed store. Clones share the same entries.
///
/// Expired entries are dropped lazily on read and in bulk by
/// [`cleanup_expired`](MemoryStore::cleanup_expired), which
/// [`spawn_cleanup_task`](crate::tasks::spawn_cleanup_task) runs periodically.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, StoreEntry>>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Time To Live ==
    /// Remaining lifetime of a live entry, `None` if absent or expired.
    ///
    /// An entry that never expires reports `Duration::MAX`.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.ttl_remaining().unwrap_or(Duration::MAX))
    }

    /// Returns true if `key` holds a live entry.
    pub async fn contains(&self, key: &str) -> bool {
        self.ttl_remaining(key).await.is_some()
    }

    // == Length ==
    /// Returns the number of entries held, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        // Write lock: an expired entry is removed on the way out.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                trace!("memory store: {} expired", key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, expire_seconds: u64) -> StoreResult<()> {
        let entry = StoreEntry::new(value.to_string(), expire_seconds);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}
