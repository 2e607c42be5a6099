//! Error types for the memoization layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Failure talking to the external key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or the request failed in transit
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with something other than GET/SET semantics
    #[error("Unexpected store response: {0}")]
    Protocol(String),
}

// == Codec Error Enum ==
/// Failure converting a result value to or from its stored text form.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The value has no textual encoding (non-UTF-8 bytes, NaN, non-string map keys, ...)
    #[error("Unsupported value: {0}")]
    Unsupported(String),

    /// Cached text is not valid JSON
    #[error("Malformed cached value: {0}")]
    Malformed(#[from] serde_json::Error),
}

// == Memo Error Enum ==
/// Error returned by a memoized call.
///
/// `E` is the wrapped callable's own error type and is passed through untouched.
#[derive(Error, Debug)]
pub enum MemoError<E> {
    /// GET or SET against the store failed
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),

    /// The callable's result could not be encoded (or the cached text decoded)
    #[error(transparent)]
    Serialization(#[from] CodecError),

    /// The wrapped callable itself failed
    #[error(transparent)]
    Callable(E),
}

impl<E> MemoError<E> {
    /// Returns the callable's error, if that is what failed.
    pub fn into_callable(self) -> Option<E> {
        match self {
            MemoError::Callable(err) => Some(err),
            _ => None,
        }
    }
}

// == Result Type Aliases ==
/// Convenience Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Convenience Result type for codec operations.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Error, Debug)]
    #[error("upstream exploded")]
    struct Upstream;

    #[test]
    fn test_callable_error_is_transparent() {
        let err: MemoError<Upstream> = MemoError::Callable(Upstream);
        assert_eq!(err.to_string(), "upstream exploded");
        assert!(err.into_callable().is_some());
    }

    #[test]
    fn test_store_error_converts() {
        let err: MemoError<Upstream> = StoreError::Unavailable("connection refused".into()).into();
        assert!(matches!(err, MemoError::StoreUnavailable(_)));
        assert_eq!(err.to_string(), "Store unavailable: connection refused");
        assert!(err.into_callable().is_none());
    }

    #[test]
    fn test_malformed_from_serde() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CodecError = json_err.into();
        assert!(matches!(err, CodecError::Malformed(_)));
    }
}
