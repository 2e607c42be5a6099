//! Value Module
//!
//! The closed set of value shapes that can pass through the cache.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Number};

use crate::error::{CodecError, CodecResult};

// == Value ==
/// A cacheable value.
///
/// Containers nest freely. Date, date-time and byte variants only survive on
/// the way in: they are stored as text and come back as [`Value::Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    LocalDateTime(NaiveDateTime),
    DateTime(DateTime<FixedOffset>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    // == Type Tag ==
    /// Returns the runtime type name used in derived cache keys.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::LocalDateTime(_) => "datetime",
            Value::DateTime(_) => "datetime_tz",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    // == To JSON ==
    /// Converts to a JSON tree, flattening dates to ISO-8601 and bytes to text.
    pub fn to_json(&self) -> CodecResult<serde_json::Value> {
        let json = match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number(Number::from(*i)),
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| CodecError::Unsupported(format!("non-finite float {}", f)))?,
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(bytes) => {
                let text = std::str::from_utf8(bytes).map_err(|_| {
                    CodecError::Unsupported("byte string is not valid UTF-8".to_string())
                })?;
                serde_json::Value::String(text.to_string())
            }
            Value::Date(_) | Value::LocalDateTime(_) | Value::DateTime(_) => {
                serde_json::Value::String(self.iso_8601().unwrap_or_default())
            }
            Value::List(items) => serde_json::Value::Array(
                items.iter().map(Value::to_json).collect::<CodecResult<Vec<_>>>()?,
            ),
            Value::Map(fields) => {
                let mut map = Map::with_capacity(fields.len());
                for (name, field) in fields {
                    map.insert(name.clone(), field.to_json()?);
                }
                serde_json::Value::Object(map)
            }
        };
        Ok(json)
    }

    // == From JSON ==
    /// Builds a value from a JSON tree. Integers that fit `i64` stay integers.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(name, field)| (name, Value::from_json(field)))
                    .collect(),
            ),
        }
    }

    // == Serde Bridge ==
    /// Encodes any serde-serializable object as its field mapping.
    ///
    /// Fails with [`CodecError::Unsupported`] for shapes JSON cannot hold,
    /// such as maps keyed by non-strings.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> CodecResult<Self> {
        serde_json::to_value(value)
            .map(Value::from_json)
            .map_err(|e| CodecError::Unsupported(e.to_string()))
    }

    /// Lifts a generic value into a typed one.
    pub fn deserialize<T: DeserializeOwned>(&self) -> CodecResult<T> {
        Ok(serde_json::from_value(self.to_json()?)?)
    }

    /// ISO-8601 text for the date and date-time variants.
    pub fn iso_8601(&self) -> Option<String> {
        match self {
            Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Value::LocalDateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Value::DateTime(dt) => Some(dt.to_rfc3339()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Looks up a field of a map value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self {
            Value::Map(fields) => fields.get(field),
            _ => None,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

// == Display ==
/// Textual representation used in cache keys.
///
/// Top-level text is written raw; text nested in containers is quoted so
/// `["a, b"]` and `["a", "b"]` render differently.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Value::Date(_) | Value::LocalDateTime(_) | Value::DateTime(_) => {
                f.write_str(&self.iso_8601().unwrap_or_default())
            }
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            Value::Map(fields) => {
                f.write_str("{")?;
                for (i, (name, field)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: ", name)?;
                    field.fmt_nested(f)?;
                }
                f.write_str("}")
            }
        }
    }
}

// == Conversions ==
macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

value_from_int!(i8, i16, i32, i64, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::LocalDateTime(v)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::DateTime(v.fixed_offset())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(v: BTreeMap<String, T>) -> Self {
        Value::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>, S> From<HashMap<String, T, S>> for Value {
    fn from(v: HashMap<String, T, S>) -> Self {
        Value::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
