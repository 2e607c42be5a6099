//! Key Deriver
//!
//! Builds the store key for one invocation of a memoized callable.
//!
//! Layout, with `:` between segments:
//!
//! ```text
//! <identity>[:<name>:<type>:<value>]*[:<type>:<value>]*:<digest>
//! ```
//!
//! Named arguments come first in supplied order, then positional arguments in
//! call order. Argument names and text values are written quoted and escaped,
//! so a `:` inside them can never pass for a segment boundary. Every other
//! value renders without quotes and never starts with one. `<digest>` is the first 8 bytes of SHA-256 over everything
//! before it, hex encoded. The digest is part of the key format and must not
//! change between releases, or every cached entry goes cold.

use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::codec::Value;
use crate::memo::Args;

/// Separator between key segments.
pub const KEY_SEPARATOR: char = ':';

/// Number of digest bytes kept in the key suffix.
const DIGEST_BYTES: usize = 8;

// == Derive Key ==
/// Returns the cache key for `identity` called with `args`.
pub fn derive_key(identity: &str, args: &Args) -> String {
    let mut key = signature(identity, args);
    let digest = signature_digest(&key);
    key.push(KEY_SEPARATOR);
    key.push_str(&digest);
    key
}

// == Signature ==
/// The human-readable part of the key, before the digest.
pub fn signature(identity: &str, args: &Args) -> String {
    let mut signature = String::from(identity);

    for (name, value) in args.named_args() {
        // Writing into a String cannot fail.
        let _ = write!(signature, "{}{:?}", KEY_SEPARATOR, name);
        push_value(&mut signature, value);
    }

    for value in args.positional() {
        push_value(&mut signature, value);
    }

    signature
}

fn push_value(signature: &mut String, value: &Value) {
    let sep = KEY_SEPARATOR;
    let tag = value.type_tag();
    let _ = match value {
        Value::Text(text) => write!(signature, "{sep}{tag}{sep}{text:?}"),
        other => write!(signature, "{sep}{tag}{sep}{other}"),
    };
}

fn signature_digest(signature: &str) -> String {
    let hash = Sha256::digest(signature.as_bytes());
    hex::encode(&hash[..DIGEST_BYTES])
}

/// Fully qualified identity of a callable: the calling module path plus the
/// given name.
///
/// ```ignore
/// let identity = callable_name!(PriceFeed::quote); // "my_app::feeds::PriceFeed::quote"
/// ```
#[macro_export]
macro_rules! callable_name {
    ($($segment:ident)::+) => {
        concat!(module_path!(), $("::", stringify!($segment)),+)
    };
}
