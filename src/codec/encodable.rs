//! Encodable Module
//!
//! Compile-time contract for types a memoized function may return.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;

use crate::codec::Value;
use crate::error::{CodecError, CodecResult};

// == Encodable ==
/// A result type that can be turned into a cacheable [`Value`].
///
/// Application structs either implement this by hand or are wrapped in
/// [`Json`] to be encoded as their serde field mapping.
pub trait Encodable {
    fn to_value(&self) -> CodecResult<Value>;
}

impl<T: Encodable + ?Sized> Encodable for &T {
    fn to_value(&self) -> CodecResult<Value> {
        (**self).to_value()
    }
}

impl Encodable for Value {
    fn to_value(&self) -> CodecResult<Value> {
        Ok(self.clone())
    }
}

impl Encodable for () {
    fn to_value(&self) -> CodecResult<Value> {
        Ok(Value::Null)
    }
}

macro_rules! encodable_via_from {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn to_value(&self) -> CodecResult<Value> {
                    Ok(Value::from(self.clone()))
                }
            }
        )*
    };
}

encodable_via_from!(
    bool, i8, i16, i32, i64, u16, u32, f32, f64, String, NaiveDate, NaiveDateTime
);

macro_rules! encodable_checked_int {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn to_value(&self) -> CodecResult<Value> {
                    i64::try_from(*self).map(Value::Int).map_err(|_| {
                        CodecError::Unsupported(format!("integer {} overflows i64", self))
                    })
                }
            }
        )*
    };
}

encodable_checked_int!(u8, u64, usize, i128, u128);

impl Encodable for str {
    fn to_value(&self) -> CodecResult<Value> {
        Ok(Value::Text(self.to_string()))
    }
}

impl<Tz: TimeZone> Encodable for DateTime<Tz> {
    fn to_value(&self) -> CodecResult<Value> {
        Ok(Value::DateTime(self.fixed_offset()))
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn to_value(&self) -> CodecResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }
}

impl<T: Encodable> Encodable for [T] {
    fn to_value(&self) -> CodecResult<Value> {
        self.iter()
            .map(Encodable::to_value)
            .collect::<CodecResult<Vec<_>>>()
            .map(Value::List)
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn to_value(&self) -> CodecResult<Value> {
        self.as_slice().to_value()
    }
}

impl<T: Encodable> Encodable for BTreeMap<String, T> {
    fn to_value(&self) -> CodecResult<Value> {
        encode_fields(self.iter())
    }
}

impl<T: Encodable, S> Encodable for HashMap<String, T, S> {
    fn to_value(&self) -> CodecResult<Value> {
        encode_fields(self.iter())
    }
}

fn encode_fields<'a, T, I>(fields: I) -> CodecResult<Value>
where
    T: Encodable + 'a,
    I: Iterator<Item = (&'a String, &'a T)>,
{
    let mut map = BTreeMap::new();
    for (name, field) in fields {
        map.insert(name.clone(), field.to_value()?);
    }
    Ok(Value::Map(map))
}

// == Json Wrapper ==
/// Encodes any serde-serializable object as its field mapping.
///
/// ```ignore
/// #[derive(Serialize)]
/// struct Quote { symbol: String, price: f64 }
///
/// Ok(Json(Quote { symbol: "ACME".into(), price: 12.5 }))
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T: Serialize> Encodable for Json<T> {
    fn to_value(&self) -> CodecResult<Value> {
        Value::from_serialize(&self.0)
    }
}
