use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A single SQL value, either parsed from a literal, decoded from a bound parameter, or read from
/// a backend row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// Arbitrary precision numbers are carried in their textual form.
    Decimal(SmolStr),
    String(String),
    Bytes(Vec<u8>),
}

impl ScalarValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Widens any integer variant to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int16(v) => Some(*v as i64),
            ScalarValue::Int32(v) => Some(*v as i64),
            ScalarValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Float32(v) => Some(*v as f64),
            ScalarValue::Float64(v) => Some(*v),
            ScalarValue::Decimal(v) => v.parse().ok(),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(v) => Some(v),
            ScalarValue::Decimal(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    /// Writes the PostgreSQL text representation of the value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => f.write_str("NULL"),
            ScalarValue::Boolean(v) => f.write_str(if *v { "t" } else { "f" }),
            ScalarValue::Int16(v) => write!(f, "{v}"),
            ScalarValue::Int32(v) => write!(f, "{v}"),
            ScalarValue::Int64(v) => write!(f, "{v}"),
            ScalarValue::Float32(v) => write!(f, "{v}"),
            ScalarValue::Float64(v) => write!(f, "{v}"),
            ScalarValue::Decimal(v) => f.write_str(v),
            ScalarValue::String(v) => f.write_str(v),
            ScalarValue::Bytes(v) => {
                f.write_str("\\x")?;
                v.iter().try_for_each(|b| write!(f, "{b:02x}"))
            }
        }
    }
}

macro_rules! impl_from_for_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ScalarValue {
                #[inline]
                fn from(value: $ty) -> Self {
                    ScalarValue::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_for_scalar!(
    bool => Boolean,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
);

impl<T: Into<ScalarValue>> From<Option<T>> for ScalarValue {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(ScalarValue::Null, Into::into)
    }
}
