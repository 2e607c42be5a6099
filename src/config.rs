//! Configuration Module
//!
//! Handles loading memoizer and store settings from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::memo::DEFAULT_TTL_SECONDS;

/// Which store implementation backs the memoizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// In-process [`MemoryStore`](crate::store::MemoryStore)
    #[default]
    Memory,
    /// Remote REST cache server via [`HttpStore`](crate::store::HttpStore)
    Http,
    /// Redis server (requires the `redis-store` feature)
    Redis,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "http" => Ok(StoreBackend::Http),
            "redis" => Ok(StoreBackend::Redis),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Http => "http",
            StoreBackend::Redis => "redis",
        })
    }
}

/// Memoizer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in seconds written with every cached result
    pub default_ttl: u64,
    /// Store implementation to use
    pub backend: StoreBackend,
    /// Address of the remote store (http or redis backends)
    pub store_url: String,
    /// Sweep interval in seconds for the memory backend
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_TTL` - Cached result TTL in seconds (default: 300)
    /// - `MEMO_BACKEND` - `memory`, `http` or `redis` (default: memory)
    /// - `MEMO_STORE_URL` - Remote store address (default: http://127.0.0.1:3000)
    /// - `CLEANUP_INTERVAL` - Memory store sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env::var("MEMO_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
            backend: env::var("MEMO_BACKEND")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.backend),
            store_url: env::var("MEMO_STORE_URL").unwrap_or(defaults.store_url),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECONDS,
            backend: StoreBackend::Memory,
            store_url: "http://127.0.0.1:3000".to_string(),
            cleanup_interval: 1,
        }
    }
}
