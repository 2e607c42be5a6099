//! Codec Module
//!
//! Converts result values to the JSON text kept in the store and back.
//!
//! Decoding is structural only: dates, date-times and byte strings are stored
//! as text and are returned as [`Value::Text`]. Callers treat cached results
//! as data, or lift them with [`Value::deserialize`].

mod encodable;
mod value;

pub use encodable::{Encodable, Json};
pub use value::Value;

use crate::error::{CodecError, CodecResult};

// == Encode ==
/// Serializes a value to its stored text form.
pub fn encode(value: &Value) -> CodecResult<String> {
    serde_json::to_string(&value.to_json()?).map_err(|e| CodecError::Unsupported(e.to_string()))
}

/// Converts a callable's result and serializes it in one step.
pub fn encode_result<R: Encodable + ?Sized>(result: &R) -> CodecResult<String> {
    encode(&result.to_value()?)
}

// == Decode ==
/// Parses stored text back into a generic value.
pub fn decode(text: &str) -> CodecResult<Value> {
    Ok(Value::from_json(serde_json::from_str(text)?))
}
