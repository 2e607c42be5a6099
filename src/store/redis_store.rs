//! Redis Store Module
//!
//! Store backed by a Redis server, enabled with the `redis-store` feature.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::store::KeyValueStore;

// == Redis Store ==
/// Store using `GET` and `SET key value EX ttl` over a shared,
/// auto-reconnecting connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    // == Constructor ==
    /// Connects to the server at `url`, e.g. `redis://localhost:6379/0`.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = ConnectionManager::new(client).await.map_err(unavailable)?;
        info!("Connected to redis at {}", url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await
            .map_err(unavailable)
    }

    async fn set_ex(&self, key: &str, value: &str, expire_seconds: u64) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(expire_seconds)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(unavailable)
    }
}

fn unavailable(err: redis::RedisError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}
