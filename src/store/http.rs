//! HTTP Store Module
//!
//! Client for a mini_redis-compatible REST cache server:
//!
//! - `PUT /set` with `{"key", "value", "ttl"}`
//! - `GET /get/:key`, `404` when the key is absent or expired

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::models::{ErrorResponse, GetResponse, SetRequest};
use crate::store::KeyValueStore;

// == HTTP Store ==
/// Store backed by a remote REST cache server.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    // == Constructor ==
    /// Creates a store talking to the server at `base_url`.
    pub fn new(base_url: &str) -> StoreResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a store that reuses an existing HTTP client.
    pub fn with_client(client: Client, base_url: &str) -> StoreResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Protocol(format!("invalid store url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Protocol(format!(
                "store url {} cannot carry a path",
                base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base url, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> StoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Protocol(format!("store url {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl KeyValueStore for HttpStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let url = self.endpoint(&["get", key])?;
        trace!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(unavailable)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: GetResponse = response
                    .json()
                    .await
                    .map_err(|e| StoreError::Protocol(e.to_string()))?;
                Ok(Some(body.value))
            }
            _ => Err(error_from(response).await),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, expire_seconds: u64) -> StoreResult<()> {
        let url = self.endpoint(&["set"])?;
        trace!("PUT {} key={}", url, key);

        let response = self
            .client
            .put(url)
            .json(&SetRequest::with_ttl(key, value, expire_seconds))
            .send()
            .await
            .map_err(unavailable)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from(response).await)
        }
    }
}

fn unavailable(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// Maps a failed response: server faults are outages, anything else is a
/// protocol mismatch.
async fn error_from(response: Response) -> StoreError {
    let status = response.status();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => format!("{}: {}", status, body.error),
        Err(_) => status.to_string(),
    };

    if status.is_server_error() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Protocol(message)
    }
}
