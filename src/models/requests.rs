//! Request DTOs for the REST cache protocol
//!
//! Defines the structure of outgoing HTTP request bodies.

use serde::{Deserialize, Serialize};

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The encoded result
/// - `ttl`: Expiry in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
    /// TTL in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Creates a SET request with an expiry.
    pub fn with_ttl(key: impl Into<String>, value: impl Into<String>, ttl: u64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl: Some(ttl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_serialize() {
        let req = SetRequest::with_ttl("k", "[1,2]", 60);
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"key":"k","value":"[1,2]","ttl":60}"#);
    }

    #[test]
    fn test_set_request_deserialize_without_ttl() {
        let json = r#"{"key": "test", "value": "hello"}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, "hello");
        assert!(req.ttl.is_none());
    }
}
