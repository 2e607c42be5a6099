//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside a memoizer.
//!
//! # Tasks
//! - TTL Cleanup: Sweeps expired entries out of a [`MemoryStore`](crate::store::MemoryStore)

mod cleanup;

pub use cleanup::spawn_cleanup_task;
