//! Memo Module
//!
//! Key derivation and the get / compute / populate protocol around the store.

mod args;
mod key;
mod memoized;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use args::Args;
pub use key::{derive_key, signature, KEY_SEPARATOR};
pub use memoized::{BoundMemoized, Memoized, Memoizer, DEFAULT_TTL_SECONDS};
pub use stats::CacheStats;
