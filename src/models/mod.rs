//! Wire models for the REST cache protocol
//!
//! The DTOs exchanged with a mini_redis-compatible cache server by
//! [`HttpStore`](crate::store::HttpStore).

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::SetRequest;
pub use responses::{ErrorResponse, GetResponse};
