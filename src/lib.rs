//! Redis Memo - memoize async function calls in an external key-value store
//!
//! Results are keyed by a deterministic fingerprint of the callable's identity
//! and its arguments, stored as JSON text, and expire after a fixed TTL.

pub mod codec;
pub mod config;
pub mod error;
pub mod memo;
pub mod models;
pub mod store;
pub mod tasks;

pub use codec::{Encodable, Json, Value};
pub use config::{Config, StoreBackend};
pub use error::{CodecError, MemoError, StoreError};
pub use memo::{Args, BoundMemoized, CacheStats, Memoized, Memoizer};
pub use store::{HttpStore, KeyValueStore, MemoryStore};
pub use tasks::spawn_cleanup_task;
