//! Store Entry Module
//!
//! A single value held by the in-memory store, with its expiry deadline.

use std::time::{Duration, Instant};

// == Store Entry ==
/// Represents a single stored value and when it stops being visible.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored text
    pub value: String,
    /// When the entry was written
    pub created_at: Instant,
    /// When the entry expires, `None` if the TTL reaches past what `Instant` can hold
    pub expires_at: Option<Instant>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry that expires `ttl_seconds` from now.
    ///
    /// A TTL too large to represent as a deadline never expires.
    pub fn new(value: String, ttl_seconds: u64) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now.checked_add(Duration::from_secs(ttl_seconds)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its deadline, so a
    /// zero TTL is never visible.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => Instant::now() >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the time left before expiry, zero once expired.
    ///
    /// Returns `None` for an entry that never expires.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}
