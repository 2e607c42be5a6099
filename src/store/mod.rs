//! Store Module
//!
//! The external key-value store the memoizer reads from and writes to.
//! Only two operations are needed: GET and SET-with-expiry.

mod entry;
mod http;
mod memory;
#[cfg(feature = "redis-store")]
mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;

// Re-export public types
pub use entry::StoreEntry;
pub use http::HttpStore;
pub use memory::MemoryStore;
#[cfg(feature = "redis-store")]
pub use redis_store::RedisStore;

// == Key Value Store ==
/// GET / SET-with-expiry access to a shared store.
///
/// Implementations must be safe to share between many memoized callables.
/// Expiry is owned by the store; callers never read or extend a TTL.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, overwriting, expiring after `expire_seconds`.
    async fn set_ex(&self, key: &str, value: &str, expire_seconds: u64) -> StoreResult<()>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, expire_seconds: u64) -> StoreResult<()> {
        (**self).set_ex(key, value, expire_seconds).await
    }
}
